//! ListenerProcessor: materializes the root listener addresses from
//! configuration. Whether the listeners actually appear
//! in the final [`Dag`](crate::dag::entities::Dag) is decided at finalize
//! time, once it's known whether any vhost exists for that protocol.

use super::{BuilderContext, Processor};

pub struct ListenerProcessor;

impl Processor for ListenerProcessor {
    fn process(&self, ctx: &mut BuilderContext<'_>) {
        ctx.http_listener_address = Some(("0.0.0.0".to_string(), 8080));
        ctx.https_listener_address = Some(("0.0.0.0".to_string(), 8443));
    }
}
