use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// Request-scoped values passed to every service method.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub method: String,
    pub metadata: BTreeMap<String, String>,
}

impl Context {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            metadata: BTreeMap::new(),
        }
    }
}

// Failure raised by an endpoint, including type mismatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointError {
    pub message: String,
}

impl EndpointError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl EndpointError {
    pub fn service(err: impl fmt::Display) -> Self {
        Self::new(err.to_string())
    }
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EndpointError {}

// A type-erased call into the service.
pub type Endpoint = Box<
    dyn Fn(&Context, Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>, EndpointError>
        + Send
        + Sync,
>;

pub trait Handler: Send + Sync {
    fn method_name(&self) -> &'static str;

    fn endpoint(&self, svc: Arc<dyn Any + Send + Sync>) -> Endpoint;

    fn decode(&self, request: Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>, EndpointError>;

    fn encode(&self, response: Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>, EndpointError>;
}

pub fn dispatch(
    handler: &dyn Handler,
    svc: Arc<dyn Any + Send + Sync>,
    ctx: &Context,
    request: Box<dyn Any + Send>,
) -> Result<Box<dyn Any + Send>, EndpointError> {
    let request = handler.decode(request)?;
    let endpoint = handler.endpoint(svc);
    let response = endpoint(ctx, request)?;
    handler.encode(response)
}
