/// Catroweb token helpers.
///
/// Upload tokens authenticate the Pocket Code app when it uploads programs on
/// behalf of a user. They are opaque random strings stored with the account.
pub mod tokens;
