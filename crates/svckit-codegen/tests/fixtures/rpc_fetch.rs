use std::any::Any;
use std::sync::Arc;
use crate::autogen::Context;
use crate::autogen::Endpoint;
use crate::autogen::EndpointError;
use crate::autogen::Handler;
use crate::pb::kv::KvService;

// Fetches a value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchEndpoint;

impl FetchEndpoint {
    pub fn name(&self) -> &'static str {
        "Fetch"
    }
}

impl FetchEndpoint {
    pub fn make_endpoint(&self, svc: Arc<dyn Any + Send + Sync>) -> Endpoint {
        Box::new(move |ctx: &Context, request: Box<dyn Any + Send>| {
            let Some(s) = svc.downcast_ref::<crate::service::ServiceImpl>() else {
                return Err(EndpointError::new("invalid service"));
            };
            let Ok(req) = request.downcast::<crate::pb::kv::FetchRequest>() else {
                return Err(EndpointError::new("invalid service request"));
            };
            let resp = s.fetch(ctx, *req).map_err(EndpointError::service)?;
            Ok(Box::new(resp) as Box<dyn Any + Send>)
        })
    }
}

impl FetchEndpoint {
    pub fn decode_request(
        &self,
        request: Box<dyn Any + Send>,
    ) -> Result<Box<dyn Any + Send>, EndpointError> {
        match request.downcast::<crate::pb::kv::FetchRequest>() {
            Ok(req) => Ok(req as Box<dyn Any + Send>),
            Err(_) => Err(EndpointError::new("invalid service request")),
        }
    }
}

impl FetchEndpoint {
    pub fn encode_response(
        &self,
        response: Box<dyn Any + Send>,
    ) -> Result<Box<dyn Any + Send>, EndpointError> {
        match response.downcast::<crate::pb::kv::FetchResponse>() {
            Ok(resp) => Ok(resp as Box<dyn Any + Send>),
            Err(_) => Err(EndpointError::new("invalid service response")),
        }
    }
}

impl Handler for FetchEndpoint {
    fn method_name(&self) -> &'static str {
        self.name()
    }

    fn endpoint(&self, svc: Arc<dyn Any + Send + Sync>) -> Endpoint {
        self.make_endpoint(svc)
    }

    fn decode(&self, request: Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>, EndpointError> {
        self.decode_request(request)
    }

    fn encode(&self, response: Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>, EndpointError> {
        self.encode_response(response)
    }
}
