//! GatewayAPIProcessor: reserved, optional pipeline slot. Gateway API
//! object kinds are not modeled among this crate's
//! source entities, so this processor is a no-op — it exists so a future
//! processor can occupy this position in the fixed order without
//! reshuffling the other four.

use super::{BuilderContext, Processor};

pub struct GatewayApiProcessor;

impl Processor for GatewayApiProcessor {
    fn process(&self, _ctx: &mut BuilderContext<'_>) {}
}
