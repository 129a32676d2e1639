//! The control loop: Probe → StateMachine → Announcer, once per tick.
//!
//! # Lifecycle
//! ```text
//! Running  --signal-->  Draining  --withdrawals written-->  Stopped
//! ```
//!
//! # Design Decisions
//! - One tick at a time; routes are probed sequentially
//! - The wait between ticks races the shutdown channel, the probe does not
//! - A signal seen mid-tick ends the tick before the next route is probed
//! - Drain withdraws every announced route regardless of current health

use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{self, MissedTickBehavior};

use crate::bgp::{RouteAction, RouteAnnouncer};
use crate::config::loader::ConfigError;
use crate::config::schema::ControllerConfig;
use crate::controller::route::ControlledRoute;
use crate::controller::ControllerError;
use crate::health::{HealthCheck, RouteState, Transition};
use crate::observability::metrics;

/// Process-level lifecycle of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Running,
    Draining,
    Stopped,
}

/// Health-driven route controller.
pub struct ControlLoop<P, W> {
    probe: P,
    announcer: RouteAnnouncer<W>,
    routes: Vec<ControlledRoute>,
    poll_interval: Duration,
    probe_timeout: Duration,
    phase: LoopPhase,
}

impl<P, W> ControlLoop<P, W>
where
    P: HealthCheck,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        probe: P,
        announcer: RouteAnnouncer<W>,
        routes: Vec<ControlledRoute>,
        poll_interval: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            probe,
            announcer,
            routes,
            poll_interval,
            probe_timeout,
            phase: LoopPhase::Running,
        }
    }

    /// Build a loop from a validated configuration.
    pub fn from_config(
        config: &ControllerConfig,
        probe: P,
        announcer: RouteAnnouncer<W>,
    ) -> Result<Self, ConfigError> {
        let routes = config
            .routes
            .iter()
            .map(|route| ControlledRoute::from_config(route, &config.health))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::Validation(vec![e]))?;

        Ok(Self::new(
            probe,
            announcer,
            routes,
            config.health.poll_interval(),
            config.health.probe_timeout(),
        ))
    }

    /// Probe every route once and emit a command for each transition.
    ///
    /// Returns the number of commands written.
    pub async fn tick(&mut self) -> Result<usize, ControllerError> {
        match self.probe_routes(None).await? {
            TickOutcome::Completed(emitted) | TickOutcome::Interrupted(emitted) => Ok(emitted),
        }
    }

    /// One pass over the routes. With a shutdown receiver, the pass stops
    /// before starting the next probe once shutdown has been signalled.
    async fn probe_routes(
        &mut self,
        mut shutdown: Option<&mut broadcast::Receiver<()>>,
    ) -> Result<TickOutcome, ControllerError> {
        let mut emitted = 0;

        for route in &mut self.routes {
            if shutdown.as_deref_mut().is_some_and(shutdown_requested) {
                return Ok(TickOutcome::Interrupted(emitted));
            }

            let result = self.probe.check(route.endpoint(), self.probe_timeout).await;
            let label = route.spec().to_string();
            metrics::record_probe(&label, &result);

            let action = match route.observe(&result) {
                Some(Transition::Announce) => RouteAction::Announce,
                Some(Transition::Withdraw) => RouteAction::Withdraw,
                None => continue,
            };
            self.announcer.send(action, route.spec()).await?;
            emitted += 1;
        }

        Ok(TickOutcome::Completed(emitted))
    }

    /// Withdraw every announced route, then stop.
    ///
    /// All withdrawals are attempted even if one write fails; the first
    /// failure is returned.
    pub async fn drain(&mut self) -> Result<usize, ControllerError> {
        self.phase = LoopPhase::Draining;
        tracing::info!(
            announced = self.announced_count(),
            "Draining routes before exit"
        );

        let mut withdrawn = 0;
        let mut failed = 0;
        let mut first_error = None;

        for route in &mut self.routes {
            if route.state() != RouteState::Announced {
                continue;
            }
            match self.announcer.withdraw(route.spec()).await {
                Ok(()) => {
                    route.force_withdraw();
                    withdrawn += 1;
                }
                Err(e) => {
                    tracing::error!(route = %route.spec(), error = %e, "Withdraw failed during drain");
                    failed += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        self.phase = LoopPhase::Stopped;
        match first_error {
            Some(source) => Err(ControllerError::Drain { failed, source }),
            None => {
                tracing::info!(withdrawn, "Drain complete");
                Ok(withdrawn)
            }
        }
    }

    /// Run until `shutdown` fires (or its sender is dropped), then drain.
    ///
    /// Returns the command channel once every withdrawal is written.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<W, ControllerError> {
        tracing::info!(
            routes = self.routes.len(),
            interval_ms = self.poll_interval.as_millis() as u64,
            timeout_ms = self.probe_timeout.as_millis() as u64,
            "Control loop starting"
        );
        for route in &self.routes {
            metrics::record_route_state(&route.spec().to_string(), route.state());
        }

        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Control loop received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    if let TickOutcome::Interrupted(_) = self.probe_routes(Some(&mut shutdown)).await? {
                        tracing::info!("Control loop received shutdown signal mid-tick");
                        break;
                    }
                }
            }
        }

        self.drain().await?;
        Ok(self.announcer.into_inner())
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn routes(&self) -> &[ControlledRoute] {
        &self.routes
    }

    pub fn announcer(&self) -> &RouteAnnouncer<W> {
        &self.announcer
    }

    fn announced_count(&self) -> usize {
        self.routes
            .iter()
            .filter(|r| r.state() == RouteState::Announced)
            .count()
    }
}

/// How a pass over the routes ended, with the number of commands written.
enum TickOutcome {
    Completed(usize),
    Interrupted(usize),
}

/// A pending message, a lagged receiver and a dropped sender all mean stop.
fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}
