mod cucumber;

use ::cucumber::{writer, World};
use log::*;
use order_sim_engine::test_utils::prepare_env::prepare_test_env;
use tokio::runtime::Runtime;

use crate::cucumber::OrderSimWorld;

fn main() {
    prepare_test_env();
    let sys = Runtime::new().unwrap();
    sys.block_on(OrderSimWorld::cucumber().with_writer(writer::Libtest::or_basic()).run("tests/features"));
    info!("🚀️ Tests complete");
}
