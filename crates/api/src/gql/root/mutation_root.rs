use async_graphql::MergedObject;

use crate::gql::domains::bans::BanMutation;
use crate::gql::domains::forms::FormMutation;
use crate::gql::domains::invites::InviteMutation;
use crate::gql::domains::notifications::NotificationMutation;
use crate::gql::domains::registrations::RegistrationMutation;
use crate::gql::domains::staff::StaffMutation;
use crate::gql::domains::stages::StageMutation;
use crate::gql::domains::tournaments::TournamentMutation;
use crate::gql::domains::users::UserMutation;

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    BanMutation,
    FormMutation,
    InviteMutation,
    NotificationMutation,
    RegistrationMutation,
    StaffMutation,
    StageMutation,
    TournamentMutation,
    UserMutation,
);
