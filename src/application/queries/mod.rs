pub mod get_all_users_query;
