//! GraphQL documents used by the gateway.

use tradedesk_core::Mt5Stream;

/// A named GraphQL operation and the root field whose value it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub field: &'static str,
    pub document: &'static str,
}

macro_rules! mutation_response {
    () => {
        "... on SuccessResponse { status message data } \
         ... on ErrorResponse { status message errorCode details }"
    };
}

macro_rules! user_fields {
    () => {
        "id email username displayName roles status lastLoginAt createdAt updatedAt"
    };
}

pub const LOGIN: Operation = Operation {
    name: "Login",
    field: "login",
    document: concat!(
        "mutation Login($input: LoginInput!) { login(input: $input) { ",
        "accessToken refreshToken user { ",
        user_fields!(),
        " } } }"
    ),
};

pub const REFRESH_TOKEN: Operation = Operation {
    name: "RefreshToken",
    field: "refreshToken",
    document: concat!(
        "mutation RefreshToken($refreshToken: String!) { ",
        "refreshToken(refreshToken: $refreshToken) { accessToken refreshToken user { ",
        user_fields!(),
        " } } }"
    ),
};

pub const ME: Operation = Operation {
    name: "Me",
    field: "me",
    document: concat!("query Me { me { ", user_fields!(), " } }"),
};

pub const USERS: Operation = Operation {
    name: "GetUsers",
    field: "users",
    document: concat!(
        "query GetUsers($limit: Float, $offset: Float) { users(limit: $limit, offset: $offset) { ",
        user_fields!(),
        " } }"
    ),
};

pub const USER: Operation = Operation {
    name: "GetUser",
    field: "user",
    document: concat!("query GetUser($id: ID!) { user(id: $id) { ", user_fields!(), " } }"),
};

pub const ADMIN_UPDATE_USER: Operation = Operation {
    name: "AdminUpdateUser",
    field: "adminUpdateUser",
    document: concat!(
        "mutation AdminUpdateUser($id: String!, $input: AdminUpdateUserInput!) { ",
        "adminUpdateUser(id: $id, input: $input) { ",
        user_fields!(),
        " } }"
    ),
};

pub const PING: Operation = Operation {
    name: "Ping",
    field: "ping",
    document: "query Ping { ping }",
};

pub const ACCOUNT_INFO: Operation = Operation {
    name: "Mt5AccountInfo",
    field: "mt5AccountInfo",
    document: "query Mt5AccountInfo { mt5AccountInfo { \
        login server name company currency balance equity margin marginFree leverage } }",
};

pub const POSITIONS_LIVE: Operation = Operation {
    name: "Mt5PositionsLive",
    field: "mt5PositionsLive",
    document: "query Mt5PositionsLive { mt5PositionsLive { \
        ticket symbol volume type priceOpen priceCurrent profit magic sl tp } }",
};

pub const ORDERS: Operation = Operation {
    name: "Mt5Orders",
    field: "mt5Orders",
    document: "query Mt5Orders { mt5Orders { \
        ticket symbol volumeCurrent type priceOpen sl tp magic state } }",
};

pub const TRADING_HISTORY: Operation = Operation {
    name: "TradingHistory",
    field: "tradingHistory",
    document: "query TradingHistory { tradingHistory { \
        id symbol volume type price profit commission swap ticketId magic openTime closeTime } }",
};

pub const CONNECT_MT5: Operation = Operation {
    name: "ConnectMt5",
    field: "connectMt5",
    document: "mutation ConnectMt5($account: MT5AccountInput!) { connectMt5(account: $account) { \
        id accountLogin server isConnected lastPing errorMessage createdAt } }",
};

pub const DISCONNECT_MT5: Operation = Operation {
    name: "DisconnectMt5",
    field: "disconnectMt5",
    document: "mutation DisconnectMt5 { disconnectMt5 }",
};

pub const PLACE_ORDER: Operation = Operation {
    name: "PlaceOrder",
    field: "placeOrder",
    document: "mutation PlaceOrder($order: OrderInput!) { placeOrder(order: $order) { \
        id symbol volume type price sl tp status ticketId magic createdAt filledAt } }",
};

pub const PLACE_BULK_ORDER: Operation = Operation {
    name: "PlaceBulkOrder",
    field: "placeBulkOrder",
    document: concat!(
        "mutation PlaceBulkOrder($bulkOrder: BulkOrderInput!) { ",
        "placeBulkOrder(bulkOrder: $bulkOrder) { ",
        mutation_response!(),
        " } }"
    ),
};

pub const CLOSE_POSITION: Operation = Operation {
    name: "ClosePosition",
    field: "closePosition",
    document: concat!(
        "mutation ClosePosition($positionId: String!) { ",
        "closePosition(positionId: $positionId) { ",
        mutation_response!(),
        " } }"
    ),
};

pub const SAVED_ACCOUNTS: Operation = Operation {
    name: "SavedMt5Accounts",
    field: "savedMt5Accounts",
    document: "query SavedMt5Accounts { savedMt5Accounts { \
        id login server path isActive lastConnected createdAt updatedAt } }",
};

pub const SAVE_ACCOUNT: Operation = Operation {
    name: "SaveMt5Account",
    field: "saveMt5Account",
    document: concat!(
        "mutation SaveMt5Account($account: SaveAccountInput!) { ",
        "saveMt5Account(account: $account) { ",
        mutation_response!(),
        " } }"
    ),
};

pub const UPDATE_SAVED_ACCOUNT: Operation = Operation {
    name: "UpdateSavedAccount",
    field: "updateSavedAccount",
    document: concat!(
        "mutation UpdateSavedAccount($account: UpdateAccountInput!) { ",
        "updateSavedAccount(account: $account) { ",
        mutation_response!(),
        " } }"
    ),
};

pub const DELETE_SAVED_ACCOUNT: Operation = Operation {
    name: "DeleteSavedAccount",
    field: "deleteSavedAccount",
    document: concat!(
        "mutation DeleteSavedAccount($accountId: String!) { ",
        "deleteSavedAccount(accountId: $accountId) { ",
        mutation_response!(),
        " } }"
    ),
};

pub const CONNECT_SAVED_ACCOUNT: Operation = Operation {
    name: "ConnectSavedAccount",
    field: "connectSavedAccount",
    document: concat!(
        "mutation ConnectSavedAccount($accountId: String!) { ",
        "connectSavedAccount(accountId: $accountId) { ",
        mutation_response!(),
        " } }"
    ),
};

pub const POSITIONS_UPDATES: Operation = Operation {
    name: "Mt5PositionsUpdates",
    field: "mt5PositionsUpdates",
    document: "subscription Mt5PositionsUpdates { mt5PositionsUpdates { \
        ticket symbol volume type priceOpen priceCurrent profit magic sl tp } }",
};

pub const ORDERS_UPDATES: Operation = Operation {
    name: "Mt5OrdersUpdates",
    field: "mt5OrdersUpdates",
    document: "subscription Mt5OrdersUpdates { mt5OrdersUpdates { \
        ticket symbol volumeCurrent type priceOpen sl tp magic state } }",
};

pub const ACCOUNT_UPDATES: Operation = Operation {
    name: "Mt5AccountUpdates",
    field: "mt5AccountUpdates",
    document: "subscription Mt5AccountUpdates { mt5AccountUpdates { \
        login server name company currency balance equity margin marginFree leverage } }",
};

/// Subscription operation for a stream.
pub fn subscription_for(stream: Mt5Stream) -> Operation {
    match stream {
        Mt5Stream::Positions => POSITIONS_UPDATES,
        Mt5Stream::Orders => ORDERS_UPDATES,
        Mt5Stream::Account => ACCOUNT_UPDATES,
    }
}
