mod core;
mod create_endpoint;

pub use core::{
    Member, MemberId, NewMember, Role, avatar_url, create_member, create_member_table,
    get_member_by_username,
};
pub use create_endpoint::create_member_endpoint;
