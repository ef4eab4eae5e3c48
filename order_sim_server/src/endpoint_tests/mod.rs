mod generate_orders;
mod helpers;
mod mocks;
mod scheduler;
