pub mod account_row;
