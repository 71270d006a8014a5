use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use delve_common::SectionCoord;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::StreamError;
use crate::generator::SectionGenerator;
use crate::section::Section;

/// A finished (or failed) background generation.
#[derive(Debug)]
pub struct Completed {
    pub coord: SectionCoord,
    pub result: Result<Section, StreamError>,
}

/// Fixed pool of threads turning section requests into generated sections.
///
/// Workers own nothing but a shared read-only generator; every section they
/// build is handed back by value over the result channel. Dropping the pool
/// closes the request channel and joins the workers.
#[derive(Debug)]
pub struct GenerationPool {
    requests: Option<Sender<SectionCoord>>,
    results: Receiver<Completed>,
    workers: Vec<JoinHandle<()>>,
}

impl GenerationPool {
    pub fn spawn(generator: Arc<SectionGenerator>, workers: usize) -> Result<Self, StreamError> {
        let (request_tx, request_rx) = unbounded::<SectionCoord>();
        let (result_tx, result_rx) = unbounded::<Completed>();
        let mut handles = Vec::with_capacity(workers);
        for n in 0..workers {
            let requests = request_rx.clone();
            let results = result_tx.clone();
            let generator = Arc::clone(&generator);
            let handle = thread::Builder::new()
                .name(format!("section-gen-{n}"))
                .spawn(move || {
                    for coord in requests.iter() {
                        let result = generator.generate(coord);
                        if results.send(Completed { coord, result }).is_err() {
                            break;
                        }
                    }
                })
                .map_err(StreamError::WorkerSpawn)?;
            handles.push(handle);
        }
        tracing::debug!(workers, "generation pool started");
        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            workers: handles,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn request(&self, coord: SectionCoord) -> Result<(), StreamError> {
        let requests = self.requests.as_ref().ok_or(StreamError::PoolDisconnected)?;
        requests
            .send(coord)
            .map_err(|_| StreamError::PoolDisconnected)
    }

    /// Everything finished since the last call, without blocking.
    pub fn drain(&self) -> Vec<Completed> {
        self.results.try_iter().collect()
    }

    /// Block up to `timeout` for the next result.
    pub fn wait(&self, timeout: Duration) -> Result<Option<Completed>, StreamError> {
        match self.results.recv_timeout(timeout) {
            Ok(done) => Ok(Some(done)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(StreamError::PoolDisconnected),
        }
    }
}

impl Drop for GenerationPool {
    fn drop(&mut self) {
        self.requests.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("generation worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_common::Seed;

    fn generator() -> Arc<SectionGenerator> {
        Arc::new(SectionGenerator::new(Seed::from("test-seed")))
    }

    #[test]
    fn pool_returns_what_it_was_asked_for() {
        let g = generator();
        let pool = GenerationPool::spawn(Arc::clone(&g), 2).unwrap();
        assert_eq!(pool.worker_count(), 2);
        let wanted = [SectionCoord::new(0, 0), SectionCoord::new(1, 0), SectionCoord::new(-3, 2)];
        for c in wanted {
            pool.request(c).unwrap();
        }
        let mut got = Vec::new();
        while got.len() < wanted.len() {
            let done = pool
                .wait(Duration::from_secs(30))
                .unwrap()
                .expect("generation finished in time");
            got.push(done);
        }
        for done in got {
            assert!(wanted.contains(&done.coord));
            let section = done.result.unwrap();
            assert_eq!(section, g.generate(done.coord).unwrap());
        }
    }

    #[test]
    fn failures_come_back_as_results() {
        let pool = GenerationPool::spawn(generator(), 1).unwrap();
        pool.request(SectionCoord::new(i32::MAX, 0)).unwrap();
        let done = pool.wait(Duration::from_secs(30)).unwrap().unwrap();
        assert!(done.result.is_err());
    }

    #[test]
    fn drain_is_non_blocking() {
        let pool = GenerationPool::spawn(generator(), 1).unwrap();
        assert!(pool.drain().is_empty());
    }
}
