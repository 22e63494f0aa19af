//! Database repositories.

pub mod component;
pub mod lab_request;
pub mod profile;

pub use component::ComponentRepository;
pub use lab_request::LabRequestRepository;
pub use profile::ProfileRepository;
