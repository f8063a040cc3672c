// Each domain contains: mod.rs, resolvers.rs, types.rs
// (plus service.rs/vars.rs where a domain carries extra logic).

pub mod bans;
pub mod forms;
pub mod invites;
pub mod notifications;
pub mod registrations;
pub mod staff;
pub mod stages;
pub mod tournaments;
pub mod users;
