//! Database entities.

pub mod lab_access_request;
pub mod lab_component;
pub mod lab_request_item;
pub mod member_profile;

pub use lab_access_request::Entity as LabAccessRequest;
pub use lab_component::Entity as LabComponent;
pub use lab_request_item::Entity as LabRequestItem;
pub use member_profile::Entity as MemberProfile;
