pub mod bans;
pub mod forms;
pub mod invites;
pub mod modpools;
pub mod notifications;
pub mod players;
pub mod rounds;
pub mod sessions;
pub mod staff_members;
pub mod staff_roles;
pub mod stages;
pub mod teams;
pub mod tournaments;
pub mod users;

pub use bans::CreateBanData;
pub use forms::{CreateFormData, UpdateFormData};
pub use invites::CreateInviteData;
pub use notifications::CreateNotificationData;
pub use players::CreatePlayerData;
pub use rounds::{CreateRoundData, UpdateRoundData};
pub use sessions::CreateSession;
pub use staff_roles::{CreateStaffRoleData, UpdateStaffRoleData};
pub use stages::{CreateStageData, UpdateStageData};
pub use tournaments::{CreateTournamentData, TournamentFilter, UpdateTournamentData};
pub use users::{OsuIdentity, UserFilter};
