//! Run loop: fetch the light state, compute the next hue, push it back.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::{
    device::{DeviceResult, LightDevice},
    strategy::HueStrategy,
};

/// Drives one light with one strategy until shutdown or the first device failure.
pub struct HueCycler<D> {
    device: D,
    strategy: HueStrategy,
    verbose: bool,
    interval: Duration,
}

impl<D: LightDevice> HueCycler<D> {
    /// Pair a device with the strategy selected for this run.
    pub fn new(device: D, strategy: HueStrategy) -> Self {
        Self {
            device,
            strategy,
            verbose: false,
            interval: Duration::ZERO,
        }
    }

    /// Log every fetched light state at `info` instead of `debug`.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Pause between iterations.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run a single fetch, compute, push cycle and return the hue that was pushed.
    pub async fn step(&mut self) -> DeviceResult<u16> {
        let mut state = self.device.fetch_light_state().await?;
        if self.verbose {
            info!(?state, "fetched light state");
        } else {
            debug!(?state, "fetched light state");
        }

        let hue = self.strategy.next_hue(state.device_hue());
        if let HueStrategy::Linear(cursor) = &self.strategy {
            debug!(hue, next = cursor.position(), "advanced gradient");
        }
        state.hue = f64::from(hue);
        self.device.push_light_state(state).await?;
        Ok(hue)
    }

    /// Loop [`step`](Self::step) until `shutdown` resolves; returns the completed iteration count.
    ///
    /// An in-flight request is abandoned when shutdown fires. Device errors end the loop.
    pub async fn run<F>(mut self, shutdown: F) -> DeviceResult<u64>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut iterations = 0_u64;

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                result = self.step() => {
                    result?;
                    iterations += 1;
                }
            }

            if !self.interval.is_zero() {
                tokio::select! {
                    biased;
                    () = &mut shutdown => break,
                    () = sleep(self.interval) => {}
                }
            }
        }

        info!(iterations, "hue cycler stopped");
        Ok(iterations)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::future::{self, BoxFuture};
    use indexmap::IndexMap;
    use reqwest::StatusCode;
    use serde_json::Map;
    use tokio::sync::oneshot;

    use super::*;
    use crate::{
        color::Color,
        device::{DeviceError, LightState},
    };

    /// In-memory light recording every pushed hue.
    #[derive(Clone)]
    struct FakeLight {
        state: Arc<Mutex<LightState>>,
        pushed: Arc<Mutex<Vec<f64>>>,
        fail_push_after: Option<usize>,
    }

    impl FakeLight {
        fn new(hue: f64) -> Self {
            Self {
                state: Arc::new(Mutex::new(LightState {
                    on: 1,
                    hue,
                    saturation: 100.0,
                    brightness: 40,
                    extra: Map::new(),
                })),
                pushed: Arc::default(),
                fail_push_after: None,
            }
        }

        fn pushed(&self) -> Vec<f64> {
            self.pushed.lock().unwrap().clone()
        }
    }

    impl LightDevice for FakeLight {
        fn fetch_light_state(&self) -> BoxFuture<'static, DeviceResult<LightState>> {
            let state = self.state.lock().unwrap().clone();
            Box::pin(future::ready(Ok(state)))
        }

        fn push_light_state(&self, state: LightState) -> BoxFuture<'static, DeviceResult<()>> {
            let mut pushed = self.pushed.lock().unwrap();
            if self.fail_push_after.is_some_and(|limit| pushed.len() >= limit) {
                return Box::pin(future::ready(Err(DeviceError::RequestStatus {
                    url: "fake://lights".into(),
                    status: StatusCode::SERVICE_UNAVAILABLE,
                })));
            }
            pushed.push(state.hue);
            *self.state.lock().unwrap() = state;
            Box::pin(future::ready(Ok(())))
        }
    }

    #[tokio::test]
    async fn rotate_follows_device_hue() {
        let light = FakeLight::new(357.0);
        let mut cycler = HueCycler::new(light.clone(), HueStrategy::Rotate);
        for _ in 0..4 {
            cycler.step().await.unwrap();
        }
        assert_eq!(light.pushed(), vec![358.0, 359.0, 0.0, 1.0]);
    }

    #[tokio::test]
    async fn rotate_restarts_from_externally_changed_hue() {
        let light = FakeLight::new(10.0);
        let mut cycler = HueCycler::new(light.clone(), HueStrategy::Rotate);
        cycler.step().await.unwrap();
        light.state.lock().unwrap().hue = 200.0;
        cycler.step().await.unwrap();
        assert_eq!(light.pushed(), vec![11.0, 201.0]);
    }

    #[tokio::test]
    async fn linear_push_keeps_other_fields() {
        let table = IndexMap::from([
            ("red".to_string(), Color::from_rgb8(255, 0, 0)),
            ("blue".to_string(), Color::from_rgb8(0, 0, 255)),
        ]);
        let strategy = HueStrategy::linear(&["red".into(), "blue".into()], &table, 3).unwrap();
        let light = FakeLight::new(77.0);
        let mut cycler = HueCycler::new(light.clone(), strategy);

        let hues = [
            cycler.step().await.unwrap(),
            cycler.step().await.unwrap(),
            cycler.step().await.unwrap(),
        ];
        assert_eq!(hues, [0, 300, 240]);

        let state = light.state.lock().unwrap().clone();
        assert_eq!(state.brightness, 40);
        assert_eq!(state.saturation, 100.0);
        assert_eq!(state.on, 1);
    }

    #[tokio::test]
    async fn run_stops_on_device_error() {
        let mut light = FakeLight::new(0.0);
        light.fail_push_after = Some(5);
        let cycler = HueCycler::new(light.clone(), HueStrategy::Rotate);

        let err = cycler.run(future::pending()).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(light.pushed().len(), 5);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let light = FakeLight::new(0.0);
        let cycler = HueCycler::new(light.clone(), HueStrategy::Random)
            .with_interval(Duration::from_millis(5));
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(cycler.run(async move {
            let _ = stopped.await;
        }));
        tokio::time::sleep(Duration::from_millis(30)).await;
        stop.send(()).unwrap();

        let iterations = handle.await.unwrap().unwrap();
        assert!(iterations > 0);
        assert_eq!(light.pushed().len() as u64, iterations);
        assert!(light.pushed().iter().all(|hue| (0.0..360.0).contains(hue)));
    }
}
