pub mod create_user_command;
pub mod login_user_command;
pub mod logout_user_command;
