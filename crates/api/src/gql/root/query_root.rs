use async_graphql::MergedObject;

use crate::gql::domains::bans::BanQuery;
use crate::gql::domains::forms::FormQuery;
use crate::gql::domains::invites::InviteQuery;
use crate::gql::domains::notifications::NotificationQuery;
use crate::gql::domains::registrations::RegistrationQuery;
use crate::gql::domains::staff::StaffQuery;
use crate::gql::domains::stages::StageQuery;
use crate::gql::domains::tournaments::TournamentQuery;
use crate::gql::domains::users::UserQuery;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    BanQuery,
    FormQuery,
    InviteQuery,
    NotificationQuery,
    RegistrationQuery,
    StaffQuery,
    StageQuery,
    TournamentQuery,
    UserQuery,
);
