//! Runs one digest task per algorithm for a file and reports the whole set once.
//!
//! Each call to [`ChecksumCoordinator::process_file`] opens a new session. The
//! per-algorithm tasks run on the tokio blocking pool and each fills only its
//! own slot; whichever task finishes last assembles the [`CompletedSession`]
//! and hands it to the caller's [`CompletionSink`]. Consumers never see a
//! partially filled session.
//!
//! Starting a new session makes every older one stale. Stale sessions are not
//! cancelled, but their completions are dropped instead of delivered.

use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, OnceLock};

use tokio::runtime::Handle;
use tokio::sync::{mpsc as tokio_mpsc, oneshot};

use crate::file_ops;
use crate::models::{Algorithm, CompletedSession, DigestResult, DigestSet, SessionId};

/// Where completed sessions are delivered. Implementations must hand the
/// session over to the consumer's own thread rather than act on it in place.
pub trait CompletionSink: Send + Sync + 'static {
    fn deliver(&self, session: CompletedSession);
}

impl CompletionSink for tokio_mpsc::UnboundedSender<CompletedSession> {
    fn deliver(&self, session: CompletedSession) {
        if self.send(session).is_err() {
            tracing::debug!("completion receiver dropped");
        }
    }
}

impl CompletionSink for mpsc::Sender<CompletedSession> {
    fn deliver(&self, session: CompletedSession) {
        if self.send(session).is_err() {
            tracing::debug!("completion receiver dropped");
        }
    }
}

/// Sink resolving a single [`oneshot::Receiver`].
pub struct OneshotSink(Mutex<Option<oneshot::Sender<CompletedSession>>>);

impl OneshotSink {
    pub fn new(sender: oneshot::Sender<CompletedSession>) -> Self {
        Self(Mutex::new(Some(sender)))
    }
}

impl CompletionSink for OneshotSink {
    fn deliver(&self, session: CompletedSession) {
        let sender = match self.0.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match sender {
            Some(sender) => {
                if sender.send(session).is_err() {
                    tracing::debug!("completion receiver dropped");
                }
            }
            None => tracing::warn!(session = %session.id, "oneshot sink already used"),
        }
    }
}

/// In-flight state of one session: a write-once slot per algorithm and the
/// number of algorithms still outstanding.
pub(crate) struct ChecksumSession {
    id: SessionId,
    path: PathBuf,
    slots: [OnceLock<DigestResult>; Algorithm::COUNT],
    remaining: AtomicUsize,
}

impl ChecksumSession {
    pub(crate) fn new(id: SessionId, path: PathBuf) -> Self {
        Self {
            id,
            path,
            slots: std::array::from_fn(|_| OnceLock::new()),
            remaining: AtomicUsize::new(Algorithm::COUNT),
        }
    }

    /// Store one algorithm's result. Returns the completed session to the
    /// caller that stored the last outstanding result, `None` to everyone else.
    pub(crate) fn record(&self, result: DigestResult) -> Option<CompletedSession> {
        let algorithm = result.algorithm;
        if self.slots[algorithm.index()].set(result).is_err() {
            tracing::warn!(session = %self.id, %algorithm, "result recorded twice, ignoring");
            return None;
        }
        // AcqRel: the last decrement must see every other slot's write.
        if self.remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
            return None;
        }
        let results: DigestSet = self.slots.iter().filter_map(|slot| slot.get().cloned()).collect();
        debug_assert!(results.is_complete());
        Some(CompletedSession {
            id: self.id,
            path: self.path.clone(),
            results,
        })
    }
}

pub struct ChecksumCoordinator {
    runtime: Handle,
    chunk_size: usize,
    current: Arc<AtomicU64>,
}

impl ChecksumCoordinator {
    pub fn new(runtime: Handle, chunk_size: usize) -> Self {
        Self {
            runtime,
            chunk_size,
            current: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Hash `path` with every algorithm in the background and deliver the
    /// complete result set to `sink` once. An empty path does nothing.
    pub fn process_file<S: CompletionSink>(&self, path: impl Into<PathBuf>, sink: S) -> Option<SessionId> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            tracing::warn!("ignoring request to hash an empty path");
            return None;
        }

        let id = SessionId(self.current.fetch_add(1, Ordering::AcqRel) + 1);
        tracing::debug!(session = %id, path = %path.display(), "starting checksum session");

        let session = Arc::new(ChecksumSession::new(id, path));
        let sink = Arc::new(sink);
        for algorithm in Algorithm::all() {
            let session = Arc::clone(&session);
            let sink = Arc::clone(&sink);
            let current = Arc::clone(&self.current);
            let chunk_size = self.chunk_size;
            self.runtime.spawn_blocking(move || {
                let result = file_ops::compute(&session.path, algorithm, chunk_size);
                tracing::debug!(session = %session.id, %algorithm, ok = result.is_success(), "digest finished");
                let Some(completed) = session.record(result) else {
                    return;
                };
                if current.load(Ordering::Acquire) != completed.id.0 {
                    tracing::debug!(session = %completed.id, "discarding stale session");
                    return;
                }
                tracing::info!(session = %completed.id, path = %completed.path.display(), "checksums ready");
                sink.deliver(completed);
            });
        }
        Some(id)
    }

    /// Future-based variant of [`process_file`](Self::process_file). The future
    /// resolves to `None` when the session was superseded before it completed.
    pub fn submit(
        &self,
        path: impl Into<PathBuf>,
    ) -> Option<(SessionId, impl Future<Output = Option<CompletedSession>> + Send + 'static)> {
        let (tx, rx) = oneshot::channel();
        let id = self.process_file(path, OneshotSink::new(tx))?;
        Some((id, async move { rx.await.ok() }))
    }

    /// Latest session id handed out, `SessionId(0)` before the first call.
    pub fn current_session(&self) -> SessionId {
        SessionId(self.current.load(Ordering::Acquire))
    }

    /// Whether `id` is still the newest session. Consumers re-check this on
    /// their own thread before accepting a delivered session.
    pub fn is_current(&self, id: SessionId) -> bool {
        self.current_session() == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashers::DEFAULT_CHUNK_SIZE;
    use std::io::Write;
    use std::time::Duration;
    use tokio::time::timeout;

    fn temp_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f.flush().unwrap();
        f
    }

    fn coordinator() -> ChecksumCoordinator {
        ChecksumCoordinator::new(Handle::current(), DEFAULT_CHUNK_SIZE)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delivers_all_three_digests_once() {
        let f = temp_file(b"abc");
        let coordinator = coordinator();
        let (tx, mut rx) = tokio_mpsc::unbounded_channel();
        let id = coordinator.process_file(f.path(), tx).unwrap();

        let session = timeout(Duration::from_secs(10), rx.recv()).await.unwrap().unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.path, f.path());
        assert!(session.results.is_complete());
        assert_eq!(session.results.digest(Algorithm::Md5), Some("900150983cd24fb0d6963f7d28e17f72"));
        assert_eq!(
            session.results.digest(Algorithm::Sha1),
            Some("a9993e364706816aba3e25717850c26c9cd0d89d")
        );
        assert_eq!(
            session.results.digest(Algorithm::Sha256),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );

        // every task has dropped its sender by now
        assert!(timeout(Duration::from_secs(10), rx.recv()).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failures_still_produce_a_complete_session() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.iso");
        let coordinator = coordinator();
        let (_, completion) = coordinator.submit(&missing).unwrap();

        let session = timeout(Duration::from_secs(10), completion).await.unwrap().unwrap();
        assert_eq!(session.results.iter().count(), 3);
        for result in session.results.iter() {
            let text = result.error().unwrap();
            assert!(text.starts_with("Failed to open"), "{text}");
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_path_is_a_no_op() {
        let coordinator = coordinator();
        let (tx, _rx) = tokio_mpsc::unbounded_channel();
        assert!(coordinator.process_file("", tx).is_none());
        assert_eq!(coordinator.current_session(), SessionId(0));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn newer_session_supersedes_older_one() {
        let first = temp_file(&vec![1u8; 4 * 1024 * 1024]);
        let second = temp_file(b"second");
        let coordinator = coordinator();
        let (tx, mut rx) = tokio_mpsc::unbounded_channel();

        let old = coordinator.process_file(first.path(), tx.clone()).unwrap();
        let new = coordinator.process_file(second.path(), tx).unwrap();
        assert!(new > old);
        assert!(!coordinator.is_current(old));
        assert!(coordinator.is_current(new));

        let mut accepted = Vec::new();
        while let Some(session) = timeout(Duration::from_secs(10), rx.recv()).await.unwrap() {
            if coordinator.is_current(session.id) {
                accepted.push(session);
            }
        }
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id, new);
        assert_eq!(accepted[0].path, second.path());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn superseded_submit_resolves_to_none_or_stale_session() {
        let first = temp_file(&vec![7u8; 4 * 1024 * 1024]);
        let second = temp_file(b"");
        let coordinator = coordinator();

        let (old, old_completion) = coordinator.submit(first.path()).unwrap();
        let (new, new_completion) = coordinator.submit(second.path()).unwrap();

        let stale = timeout(Duration::from_secs(10), old_completion).await.unwrap();
        if let Some(session) = stale {
            assert_eq!(session.id, old);
            assert!(!coordinator.is_current(session.id));
        }
        let fresh = timeout(Duration::from_secs(10), new_completion).await.unwrap().unwrap();
        assert_eq!(fresh.id, new);
        assert_eq!(fresh.results.digest(Algorithm::Md5), Some("d41d8cd98f00b204e9800998ecf8427e"));
    }

    #[test]
    fn std_channel_sink_forwards() {
        let (tx, rx) = mpsc::channel();
        let session = CompletedSession {
            id: SessionId(4),
            path: PathBuf::from("a"),
            results: DigestSet::default(),
        };
        tx.deliver(session.clone());
        assert_eq!(rx.recv().unwrap(), session);
    }

    fn sample_results() -> Vec<DigestResult> {
        vec![
            DigestResult::success(Algorithm::Md5, "m".into()),
            DigestResult::failure(Algorithm::Sha1, "Failed to compute SHA1: gone".into()),
            DigestResult::success(Algorithm::Sha256, "s".into()),
        ]
    }

    #[test]
    fn only_the_last_record_completes() {
        let session = ChecksumSession::new(SessionId(1), PathBuf::from("f"));
        let mut results = sample_results().into_iter();
        assert!(session.record(results.next().unwrap()).is_none());
        assert!(session.record(results.next().unwrap()).is_none());
        let completed = session.record(results.next().unwrap()).unwrap();
        assert!(completed.results.is_complete());
    }

    #[test]
    fn duplicate_record_is_ignored() {
        let session = ChecksumSession::new(SessionId(1), PathBuf::from("f"));
        let md5 = DigestResult::success(Algorithm::Md5, "m".into());
        assert!(session.record(md5.clone()).is_none());
        assert!(session.record(md5).is_none());
        assert_eq!(session.remaining.load(Ordering::Acquire), 2);
    }

    #[test]
    fn completion_order_does_not_matter() {
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        let results = sample_results();
        let mut completed = Vec::new();
        for order in orders {
            let session = ChecksumSession::new(SessionId(9), PathBuf::from("f"));
            let mut last = None;
            for i in order {
                last = session.record(results[i].clone());
            }
            completed.push(last.unwrap());
        }
        assert!(completed.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn concurrent_records_complete_exactly_once() {
        for _ in 0..50 {
            let session = Arc::new(ChecksumSession::new(SessionId(2), PathBuf::from("f")));
            let handles: Vec<_> = sample_results()
                .into_iter()
                .map(|result| {
                    let session = Arc::clone(&session);
                    std::thread::spawn(move || session.record(result))
                })
                .collect();
            let completions: Vec<_> = handles.into_iter().filter_map(|h| h.join().unwrap()).collect();
            assert_eq!(completions.len(), 1);
            assert_eq!(completions[0].results.iter().count(), 3);
        }
    }
}
