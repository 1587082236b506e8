pub mod profiles;
pub mod users;

pub use profiles::{
    ActiveModel as ProfileActiveModel, Column as ProfileColumn, Entity as Profiles, Model as Profile,
};
pub use users::{ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users, Model as User};
