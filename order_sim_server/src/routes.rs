//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two go into a separate module.
//!
//! Generating orders is CPU-light but publishing is I/O, so every handler that touches the pipeline is async and
//! awaits the broker rather than blocking the worker thread.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use order_sim_engine::{GenerateOrderRequest, GenerateOrders, OrderPipelineApi, OrderPublisher};

use crate::{
    config::GenerationSettings,
    data_objects::GenerationResponse,
    errors::ServerError,
    order_scheduler::OrderScheduler,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Generation  ----------------------------------------------------
route!(generate_orders => Post "/test/generate-orders" impl GenerateOrders, OrderPublisher);
/// Generates a batch of orders and publishes them.
///
/// The body is a JSON [`GenerateOrderRequest`]; every field is optional. Before the batch runs, the request is pinned
/// to the test business and, for the known channels, to the channel's integration id (see [`GenerationSettings`]).
///
/// Responds with `200` and `{generated, published, failed}` when every order was published, and with `500` and the
/// same counters plus an `error` field otherwise. A body that is not a valid request gets a `400`.
pub async fn generate_orders<G, P>(
    body: web::Bytes,
    api: web::Data<OrderPipelineApi<G, P>>,
    settings: web::Data<GenerationSettings>,
) -> Result<HttpResponse, ServerError>
where
    G: GenerateOrders,
    P: OrderPublisher,
{
    let mut request = serde_json::from_slice::<GenerateOrderRequest>(&body).map_err(|e| {
        debug!("💻️ Could not deserialize generation request. {e}");
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    settings.apply(&mut request);
    debug!(
        "💻️ Generating {} {} order(s) for integration {}",
        request.batch_size(),
        request.platform(),
        request.integration_id
    );
    match api.generate_and_publish(&request).await {
        Ok(counters) => {
            info!("💻️ Generation request complete. {counters}");
            Ok(HttpResponse::Ok().json(GenerationResponse::success(counters)))
        },
        Err(failure) => {
            warn!("💻️ Generation request partially failed. {failure}");
            Ok(HttpResponse::InternalServerError().json(GenerationResponse::failure(&failure)))
        },
    }
}

route!(scheduler_status => Get "/test/scheduler" impl GenerateOrders, OrderPublisher);
/// Reports whether the scheduler is running and what each tick does.
pub async fn scheduler_status<G, P>(scheduler: web::Data<OrderScheduler<G, P>>) -> HttpResponse
where
    G: GenerateOrders + 'static,
    P: OrderPublisher + 'static,
{
    trace!("💻️ Received scheduler status request");
    HttpResponse::Ok().json(scheduler.status())
}
