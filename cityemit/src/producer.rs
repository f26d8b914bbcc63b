//! Emission producer
//!
//! Yields a randomized, non-repeating sequence of city emissions. Each cycle
//! draws one remaining city and one color while the application is
//! foregrounded, then waits the configured interval. A backgrounded cycle
//! consumes nothing. The stream ends once every city has been emitted.

use crate::catalog::{coordinates_for, CITIES, COLORS};
use async_stream::stream;
use cityemit_common::{time, CityEmission};
use futures::stream::BoxStream;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, trace};

use crate::lifecycle::LifecycleState;

/// Anything that can hand out a stream of emissions
///
/// The repository consumes this seam so tests can substitute scripted sources.
pub trait EmissionSource: Send + Sync {
    fn emissions(&self) -> BoxStream<'static, CityEmission>;
}

/// Randomized producer over the fixed city pool
pub struct EmissionProducer {
    /// Cities not yet emitted; shared by every stream this producer hands out
    remaining: Arc<Mutex<Vec<String>>>,
    colors: Vec<String>,
    interval: Duration,
    lifecycle: watch::Receiver<LifecycleState>,
}

impl EmissionProducer {
    /// Producer over the default city pool and palette
    pub fn new(interval: Duration, lifecycle: watch::Receiver<LifecycleState>) -> Self {
        Self::with_pool(
            CITIES.iter().map(|c| c.to_string()).collect(),
            COLORS.iter().map(|c| c.to_string()).collect(),
            interval,
            lifecycle,
        )
    }

    /// Producer over a custom city pool and palette
    pub fn with_pool(
        cities: Vec<String>,
        colors: Vec<String>,
        interval: Duration,
        lifecycle: watch::Receiver<LifecycleState>,
    ) -> Self {
        Self {
            remaining: Arc::new(Mutex::new(cities)),
            colors,
            interval,
            lifecycle,
        }
    }

    /// Cities still waiting to be emitted
    pub async fn remaining_cities(&self) -> Vec<String> {
        self.remaining.lock().await.clone()
    }

    /// Stream of emissions drawn from the remaining pool
    ///
    /// Restarting production continues from whatever the previous stream left.
    pub fn produce_emissions(&self) -> BoxStream<'static, CityEmission> {
        let remaining = Arc::clone(&self.remaining);
        let colors = self.colors.clone();
        let interval = self.interval;
        let lifecycle = self.lifecycle.clone();

        Box::pin(stream! {
            loop {
                let (picked, exhausted) = {
                    let mut cities = remaining.lock().await;
                    if cities.is_empty() {
                        break;
                    }
                    if lifecycle.borrow().is_foreground() {
                        let picked = draw(&mut cities, &colors);
                        (Some(picked), cities.is_empty())
                    } else {
                        trace!("Application in background, skipping cycle");
                        (None, false)
                    }
                };

                if let Some((city, color)) = picked {
                    let (latitude, longitude) = coordinates_for(&city);
                    debug!("Producing emission for {} ({})", city, color);
                    yield CityEmission::new(city, color, time::now(), latitude, longitude);
                }

                if exhausted {
                    debug!("City pool exhausted");
                    break;
                }

                tokio::time::sleep(interval).await;
            }
        })
    }
}

impl EmissionSource for EmissionProducer {
    fn emissions(&self) -> BoxStream<'static, CityEmission> {
        self.produce_emissions()
    }
}

/// Remove a random city from the pool and pair it with a random color
fn draw(cities: &mut Vec<String>, colors: &[String]) -> (String, String) {
    let mut rng = rand::thread_rng();
    let index = rng.gen_range(0..cities.len());
    let city = cities.remove(index);
    let color = colors
        .choose(&mut rng)
        .cloned()
        .unwrap_or_else(|| "Gray".to_string());
    (city, color)
}
