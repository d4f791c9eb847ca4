//! The fixed processor pipeline. Each processor is invoked with the same
//! [`BuilderContext`](super::builder::BuilderContext) in a fixed order;
//! there is no dynamic polymorphism between route types at runtime.

pub mod extension_service;
pub mod gateway_api;
pub mod httpproxy;
pub mod ingress;
pub mod listener;

use super::builder::BuilderContext;

pub trait Processor {
    fn process(&self, ctx: &mut BuilderContext<'_>);
}
