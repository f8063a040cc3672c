//! Flat view over every domain's GraphQL types, so resolvers can import
//! cross-domain types from one place.

pub use super::domains::bans::types::{Ban, IssueBanInput};
pub use super::domains::forms::types::{
    CreateFormInput, Form, FormField, FormFieldInput, FormFieldKind, FormResponse,
    UpdateFormInput,
};
pub use super::domains::invites::types::{Invite, InviteKind, InviteStatus, SendInviteInput};
pub use super::domains::notifications::types::{MessageVarInput, NotifyInput, UserNotification};
pub use super::domains::registrations::types::{CreateTeamInput, Player, Team};
pub use super::domains::staff::types::{
    CreateStaffRoleInput, SetStaffMemberRolesInput, StaffMember, StaffRole, UpdateStaffRoleInput,
};
pub use super::domains::stages::types::{
    CreateRoundInput, CreateStageInput, Modpool, ModpoolInput, Round, Stage, StageFormat,
    UpdateRoundInput, UpdateStageInput,
};
pub use super::domains::tournaments::types::{
    CreateTournamentInput, DateWindow, DateWindowInput, GameMod, ModMultiplier,
    ModMultiplierInput, RankRangeInput, TeamSizeInput, Tournament, TournamentDatesInput,
    TournamentKind, TournamentLink, TournamentLinkInput, UpdateTournamentInput,
};
pub use super::domains::users::types::User;
