mod deal_checker;
mod health_check;
mod helpers;
