use crate::{
    admission::Admission,
    core::Validator,
    index,
    k8s,
    metrics::DecisionMetrics,
    store::{NetworkPolicies, Pods},
};
use anyhow::{bail, Result};
use clap::Parser;
use futures::prelude::*;
use kube::runtime::watcher;
use prometheus_client::registry::Registry;
use std::task::Poll;
use tokio::sync::oneshot;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "label-guard",
    about = "Warns when pod label updates escape the NetworkPolicies that select them"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "label_guard=info,warn",
        env = "LABEL_GUARD_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    server: kubert::ServerArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Disables the admission controller server.
    #[clap(long)]
    admission_controller_disabled: bool,

    /// Serves NetworkPolicy lookups from a watch-backed cache instead of listing them from the
    /// API server on each review.
    #[clap(long)]
    network_policy_cache: bool,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            server,
            admission_controller_disabled,
            network_policy_cache,
        } = self;

        let server = if admission_controller_disabled {
            None
        } else {
            Some(server)
        };

        let mut prom = <Registry>::default();
        let decision_metrics = DecisionMetrics::register(prom.sub_registry_with_prefix("admission"));

        let policy_index = network_policy_cache.then(index::Index::shared);
        if let Some(policy_index) = policy_index.as_ref() {
            index::metrics::register(
                prom.sub_registry_with_prefix("network_policy_index"),
                policy_index.clone(),
            );
        }
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .with_optional_server(server)
            .build()
            .await?;

        let policies = match policy_index {
            Some(policy_index) => {
                let network_policies =
                    runtime.watch_all::<k8s::NetworkPolicy>(watcher::Config::default());
                let (synced_tx, synced_rx) = oneshot::channel();
                tokio::spawn(
                    kubert::index::namespaced(
                        policy_index.clone(),
                        notify_synced(network_policies, synced_tx),
                    )
                    .instrument(info_span!("networkpolicies")),
                );

                // Reviews answered from a partial cache would miss policies, so the server is
                // not started until the initial listing has been indexed.
                info!("Waiting for NetworkPolicies to sync");
                if synced_rx.await.is_err() {
                    bail!("NetworkPolicy watch ended before the cache synced");
                }
                info!("Serving NetworkPolicies from cache");
                NetworkPolicies::Index(policy_index)
            }
            None => NetworkPolicies::Api(runtime.client()),
        };

        let validator = Validator::new(Pods::new(runtime.client()), policies, decision_metrics);
        let admission = Admission::new(validator);
        let runtime = runtime.spawn_server(move || admission.clone());

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

/// Passes `events` through, notifying `synced` once the first `InitDone` has been consumed.
///
/// The notification is sent when the stream is next polled, so the consumer has finished handling
/// `InitDone` before anyone observes the signal.
fn notify_synced<S, T>(
    events: S,
    synced: oneshot::Sender<()>,
) -> impl Stream<Item = watcher::Event<T>> + Send + 'static
where
    S: Stream<Item = watcher::Event<T>> + Send + 'static,
    T: Send + 'static,
{
    let mut events = Box::pin(events);
    let mut synced = Some(synced);
    let mut init_done = false;
    stream::poll_fn(move |cx| {
        if init_done {
            if let Some(tx) = synced.take() {
                let _ = tx.send(());
            }
        }

        let next = events.poll_next_unpin(cx);
        if let Poll::Ready(Some(watcher::Event::InitDone)) = &next {
            init_done = true;
        }
        next
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot::error::TryRecvError;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["label-guard"]).expect("defaults must parse");
        assert!(!args.admission_controller_disabled);
        assert!(!args.network_policy_cache);
    }

    #[test]
    fn flags() {
        let args = Args::try_parse_from([
            "label-guard",
            "--network-policy-cache",
            "--admission-controller-disabled",
        ])
        .expect("flags must parse");
        assert!(args.admission_controller_disabled);
        assert!(args.network_policy_cache);
    }

    #[tokio::test]
    async fn synced_after_init_done_is_handled() {
        let (tx, mut rx) = oneshot::channel();
        let mut events = notify_synced(
            stream::iter(vec![
                watcher::Event::Init,
                watcher::Event::InitApply(k8s::NetworkPolicy::default()),
                watcher::Event::InitDone,
                watcher::Event::Apply(k8s::NetworkPolicy::default()),
            ]),
            tx,
        );

        assert!(matches!(events.next().await, Some(watcher::Event::Init)));
        assert!(matches!(events.next().await, Some(watcher::Event::InitApply(_))));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        assert!(matches!(events.next().await, Some(watcher::Event::InitDone)));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        assert!(matches!(events.next().await, Some(watcher::Event::Apply(_))));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn unsynced_watch_drops_notification() {
        let (tx, rx) = oneshot::channel();
        let events = notify_synced(
            stream::iter(vec![watcher::Event::<k8s::NetworkPolicy>::Init]),
            tx,
        );
        assert_eq!(events.count().await, 1);
        assert!(rx.await.is_err());
    }
}
