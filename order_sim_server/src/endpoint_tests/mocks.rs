use mockall::mock;
use order_sim_engine::{CanonicalOrder, GenerateOrderRequest, GenerateOrders, GeneratorError};

mock! {
    pub Generator {}
    impl GenerateOrders for Generator {
        fn generate(&self, request: &GenerateOrderRequest) -> Result<CanonicalOrder, GeneratorError>;
    }
}
