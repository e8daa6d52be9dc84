use crate::{
    core::{Labels, PolicySource, Validator, Verdict, WorkloadRef, WorkloadStore},
    k8s::{self, Resource},
    metrics::DecisionMetrics,
};
use anyhow::{anyhow, Result};
use bytes::{Buf, Bytes};
use futures::future;
use http_body_util::BodyExt;
use hyper::{http, Request, Response};
use kube::core::{admission::Operation, DynamicObject};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Serves `ValidatingWebhookConfiguration` requests for pod label updates.
pub struct Admission<S, P> {
    validator: Arc<Validator<S, P, DecisionMetrics>>,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read request body: {0}")]
    Request(#[from] hyper::Error),

    #[error("failed to encode json response: {0}")]
    Json(#[from] serde_json::Error),
}

type Review = kube::core::admission::AdmissionReview<DynamicObject>;
type AdmissionRequest = kube::core::admission::AdmissionRequest<DynamicObject>;
type AdmissionResponse = kube::core::admission::AdmissionResponse;
type AdmissionReview = kube::core::admission::AdmissionReview<DynamicObject>;

type Body = http_body_util::Full<Bytes>;

// === impl AdmissionService ===

impl<S, P> tower::Service<Request<hyper::body::Incoming>> for Admission<S, P>
where
    S: WorkloadStore + Send + Sync + 'static,
    P: PolicySource + Send + Sync + 'static,
{
    type Response = Response<Body>;
    type Error = Error;
    type Future = future::BoxFuture<'static, Result<Response<Body>, Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<hyper::body::Incoming>) -> Self::Future {
        trace!(?req);
        if !is_review(&req) {
            return Box::pin(future::ok(not_found()));
        }

        let admission = self.clone();
        Box::pin(async move {
            let bytes = req.into_body().collect().await?.to_bytes();
            admission.review(bytes).await
        })
    }
}

impl<S, P> Clone for Admission<S, P> {
    fn clone(&self) -> Self {
        Self {
            validator: self.validator.clone(),
        }
    }
}

impl<S, P> Admission<S, P>
where
    S: WorkloadStore + Send + Sync,
    P: PolicySource + Send + Sync,
{
    pub fn new(validator: Validator<S, P, DecisionMetrics>) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }

    async fn review(self, bytes: Bytes) -> Result<Response<Body>, Error> {
        let review: Review = match serde_json::from_reader(bytes.reader()) {
            Ok(review) => review,
            Err(error) => {
                warn!(%error, "Failed to parse request body");
                return json_response(AdmissionResponse::invalid(error).into_review());
            }
        };
        trace!(?review);

        let rsp = match review.try_into() {
            Ok(req) => {
                debug!(?req);
                self.admit(req).await
            }
            Err(error) => {
                warn!(%error, "Invalid admission request");
                AdmissionResponse::invalid(error)
            }
        };
        debug!(?rsp);
        json_response(rsp.into_review())
    }

    async fn admit(self, req: AdmissionRequest) -> AdmissionResponse {
        if !is_kind::<k8s::Pod>(&req) {
            return AdmissionResponse::invalid(format_args!(
                "unsupported resource type: {}.{}.{}",
                req.kind.group, req.kind.version, req.kind.kind
            ));
        }

        let rsp = AdmissionResponse::from(&req);

        // Only creations and updates carry labels to review.
        if !matches!(req.operation, Operation::Create | Operation::Update) {
            return rsp;
        }

        let (target, labels) = match parse_pod(req) {
            Ok(pod) => pod,
            Err(error) => {
                info!(%error, "Failed to parse pod");
                return errored(rsp, http::StatusCode::BAD_REQUEST, error);
            }
        };
        info!(namespace = %target.namespace, name = %target.name, "Reviewing pod labels");

        match self.validator.validate(&target, &labels).await {
            Ok(verdict) => respond(rsp, verdict),
            Err(error) => {
                warn!(%error, "Failed to decide");
                self.validator.engine().observer().failed(&error);
                errored(rsp, http::StatusCode::INTERNAL_SERVER_ERROR, error)
            }
        }
    }
}

/// Reviews are only accepted as `POST /`.
fn is_review<B>(req: &Request<B>) -> bool {
    req.method() == http::Method::POST && req.uri().path() == "/"
}

fn not_found() -> Response<Body> {
    Response::builder()
        .status(http::StatusCode::NOT_FOUND)
        .body(Body::default())
        .expect("not found response must be valid")
}

fn is_kind<T>(req: &AdmissionRequest) -> bool
where
    T: Resource,
    T::DynamicType: Default,
{
    let dt = Default::default();
    req.kind.group.eq_ignore_ascii_case(&T::group(&dt))
        && req.kind.kind.eq_ignore_ascii_case(&T::kind(&dt))
}

fn json_response(rsp: AdmissionReview) -> Result<Response<Body>, Error> {
    let bytes = serde_json::to_vec(&rsp)?;
    Ok(Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .expect("admission review response must be valid"))
}

/// Extracts the reviewed pod's identity and proposed labels.
///
/// The request's name may be empty when the pod is created with a generated name.
fn parse_pod(req: AdmissionRequest) -> Result<(WorkloadRef, Labels)> {
    let obj = req
        .object
        .ok_or_else(|| anyhow!("admission request missing 'object'"))?;

    let namespace = req
        .namespace
        .or_else(|| obj.metadata.namespace.clone())
        .ok_or_else(|| anyhow!("admission request missing 'namespace'"))?;
    let name = if req.name.is_empty() {
        obj.metadata.name.clone().unwrap_or_default()
    } else {
        req.name
    };

    let labels = Labels::from(obj.metadata.labels);
    Ok((WorkloadRef::new(namespace, name), labels))
}

fn respond(mut rsp: AdmissionResponse, verdict: Verdict) -> AdmissionResponse {
    match verdict {
        Verdict::Allowed { reason } => {
            rsp.result.message = reason;
            rsp
        }
        Verdict::AllowedWithWarning { reason, warning } => {
            rsp.result.message = reason;
            rsp.warnings = Some(vec![warning]);
            rsp
        }
        Verdict::Denied { reason } => rsp.deny(reason),
    }
}

/// Fails the review without coercing it into a verdict, so that the API server applies the
/// webhook's failure policy.
fn errored(rsp: AdmissionResponse, code: http::StatusCode, error: impl ToString) -> AdmissionResponse {
    let mut rsp = rsp.deny(error);
    rsp.result.code = code.as_u16();
    rsp
}
