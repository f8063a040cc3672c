use async_graphql::{InputObject, OutputType, SimpleObject};

use infra::pagination::LimitOffset;

#[derive(InputObject, Clone, Copy)]
pub struct PaginationInput {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationInput {
    pub fn to_limit_offset(self) -> LimitOffset {
        LimitOffset::clamped(self.limit, self.offset)
    }
}

impl Default for PaginationInput {
    fn default() -> Self {
        Self {
            limit: Some(50),
            offset: Some(0),
        }
    }
}

#[derive(SimpleObject)]
#[graphql(concrete(name = "TournamentPage", params(crate::gql::domains::tournaments::types::Tournament)))]
#[graphql(concrete(name = "UserPage", params(crate::gql::domains::users::types::User)))]
#[graphql(concrete(name = "PlayerPage", params(crate::gql::domains::registrations::types::Player)))]
#[graphql(concrete(name = "InvitePage", params(crate::gql::domains::invites::types::Invite)))]
#[graphql(concrete(name = "BanPage", params(crate::gql::domains::bans::types::Ban)))]
#[graphql(concrete(
    name = "UserNotificationPage",
    params(crate::gql::domains::notifications::types::UserNotification)
))]
#[graphql(concrete(
    name = "FormResponsePage",
    params(crate::gql::domains::forms::types::FormResponse)
))]
pub struct PaginatedResponse<T: OutputType> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page_size: i32,
    pub offset: i32,
    pub has_next_page: bool,
}

impl<T: OutputType> PaginatedResponse<T> {
    /// Assemble a page from fetched items plus the matching total count.
    pub fn new(items: Vec<T>, total_count: i64, page: LimitOffset) -> Self {
        let page_size = items.len() as i32;
        let offset = page.offset as i32;
        Self {
            items,
            total_count,
            page_size,
            offset,
            has_next_page: i64::from(offset + page_size) < total_count,
        }
    }
}
