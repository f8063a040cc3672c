pub mod invite_reminder;

pub use invite_reminder::{spawn_invite_reminder_service, InviteReminderService};
