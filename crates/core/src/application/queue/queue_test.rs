//! Unit tests for the queue dispatch loop and lifecycle

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::QueueError;
    use crate::port::worker::mocks::MockWorker;
    use crate::port::worker_fn;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};
    use tokio_test::assert_err;

    const RECV_TIMEOUT: Duration = Duration::from_secs(2);

    type CompletionRx = tokio::sync::mpsc::UnboundedReceiver<Option<QueueError>>;

    fn queue_with_worker(
        concurrency: usize,
        worker: Arc<MockWorker>,
    ) -> (Queue<String>, CompletionRx) {
        let (on_complete, rx) = completion_channel();
        let queue = Queue::with_options(
            QueueOptions::<String>::new()
                .concurrency(concurrency)
                .worker(worker)
                .on_complete(on_complete),
        );
        (queue, rx)
    }

    #[tokio::test]
    async fn test_fifo_dispatch_with_exact_items() {
        let worker = Arc::new(MockWorker::new_success());
        let (queue, mut rx) = queue_with_worker(1, worker.clone());

        for item in ["a", "b", "c", "d", "e"] {
            queue.add(item.to_string());
        }
        queue.close();

        let outcome = timeout(RECV_TIMEOUT, rx.recv()).await.unwrap();
        assert_eq!(outcome, Some(None));
        assert_eq!(worker.processed(), vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_concurrency_cap_never_exceeded() {
        let worker = Arc::new(MockWorker::new_delay(Duration::from_millis(20)));
        let (queue, mut rx) = queue_with_worker(3, worker.clone());

        for i in 0..10 {
            queue.add(format!("item-{i}"));
        }
        queue.close();

        let outcome = timeout(RECV_TIMEOUT, rx.recv()).await.unwrap();
        assert_eq!(outcome, Some(None));
        assert_eq!(worker.call_count(), 10);
        assert!(
            worker.peak_in_flight() <= 3,
            "peak {} exceeded concurrency limit",
            worker.peak_in_flight()
        );
        // With 10 items the window should actually have filled up
        assert_eq!(worker.peak_in_flight(), 3);
    }

    #[tokio::test]
    async fn test_window_stays_full_until_items_run_out() {
        let worker = Arc::new(MockWorker::new_delay(Duration::from_millis(200)));
        let (queue, mut rx) = queue_with_worker(2, worker.clone());

        queue.add("1".to_string()).add("2".to_string()).add("3".to_string());
        queue.close();

        // Mid-run: exactly two workers in flight, the third item still pending
        sleep(Duration::from_millis(100)).await;
        assert_eq!(worker.in_flight(), 2);

        let outcome = timeout(RECV_TIMEOUT, rx.recv()).await.unwrap();
        assert_eq!(outcome, Some(None));
        assert_eq!(worker.call_count(), 3);

        // Exactly one completion for the whole epoch
        assert_err!(rx.try_recv());
    }

    #[tokio::test]
    async fn test_close_on_idle_queue_fires_synchronously() {
        let (on_complete, mut rx) = completion_channel();
        let queue: Queue<String> = Queue::new();
        queue.set_on_complete(on_complete);

        queue.close();

        // No await between close() and here: the callback ran inline
        let outcome = rx.try_recv().expect("drain callback should fire inside close()");
        assert_eq!(outcome, None);
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn test_clear_drops_only_undispatched_items() {
        let worker = Arc::new(MockWorker::new_delay(Duration::from_millis(100)));
        let (queue, mut rx) = queue_with_worker(1, worker.clone());

        queue.add("first".to_string()).add("second".to_string());
        sleep(Duration::from_millis(30)).await;

        // "first" is running, "second" still pending
        queue.clear();
        assert!(!queue.is_closed());
        queue.close();

        let outcome = timeout(RECV_TIMEOUT, rx.recv()).await.unwrap();
        assert_eq!(outcome, Some(None));
        assert_eq!(worker.processed(), vec!["first"]);
    }

    #[tokio::test]
    async fn test_worker_error_aborts_queue() {
        let worker = Arc::new(MockWorker::new_fail_on("bad", "boom"));
        let (queue, mut rx) = queue_with_worker(1, worker.clone());

        queue
            .add("ok".to_string())
            .add("bad".to_string())
            .add("never".to_string());
        queue.close();

        let outcome = timeout(RECV_TIMEOUT, rx.recv()).await.unwrap();
        assert_eq!(outcome, Some(Some(QueueError::WorkerFailed("boom".to_string()))));
        assert!(queue.is_closed());
        // The item behind the failure was discarded, not dispatched
        assert_eq!(worker.processed(), vec!["ok", "bad"]);

        // No second completion sneaks in later
        sleep(Duration::from_millis(50)).await;
        assert_err!(rx.try_recv());
    }

    #[tokio::test]
    async fn test_error_with_in_flight_workers_fires_once() {
        let (on_complete, mut rx) = completion_channel();
        let worker = worker_fn(|item: String| async move {
            if item == "bad" {
                sleep(Duration::from_millis(10)).await;
                Err(QueueError::worker("fatal"))
            } else {
                sleep(Duration::from_millis(150)).await;
                Ok(())
            }
        });
        let queue = Queue::with_options(
            QueueOptions::new()
                .concurrency(2)
                .worker(worker)
                .on_complete(on_complete),
        );

        queue.add("slow".to_string()).add("bad".to_string());
        queue.close();

        let outcome = timeout(RECV_TIMEOUT, rx.recv()).await.unwrap();
        assert_eq!(outcome, Some(Some(QueueError::WorkerFailed("fatal".to_string()))));

        // The slow worker finishes well after the abort; its completion must
        // not trigger a second callback
        sleep(Duration::from_millis(250)).await;
        assert_err!(rx.try_recv());
    }

    #[tokio::test]
    async fn test_add_after_close_is_noop() {
        let worker = Arc::new(MockWorker::new_success());
        let (queue, mut rx) = queue_with_worker(1, worker.clone());

        queue.close();
        assert_eq!(timeout(RECV_TIMEOUT, rx.recv()).await.unwrap(), Some(None));

        queue.add("late".to_string());
        sleep(Duration::from_millis(50)).await;
        assert_eq!(worker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_options_snapshot_is_isolated() {
        let queue: Queue<String> = Queue::with_options(QueueOptions::new().concurrency(5));

        let mut snapshot = queue.options();
        snapshot.concurrency = 1;
        assert_eq!(queue.concurrency(), 5);

        // Feeding a snapshot back applies it through the setters
        queue.set_options(snapshot);
        assert_eq!(queue.concurrency(), 1);
    }

    #[tokio::test]
    async fn test_set_concurrency_zero_is_ignored() {
        let queue: Queue<String> = Queue::new();
        assert_eq!(queue.concurrency(), constants::DEFAULT_CONCURRENCY);

        queue.set_concurrency(0);
        assert_eq!(queue.concurrency(), constants::DEFAULT_CONCURRENCY);

        queue.set_concurrency(4);
        assert_eq!(queue.concurrency(), 4);
    }

    #[tokio::test]
    async fn test_with_options_zero_concurrency_falls_back_to_default() {
        let queue: Queue<String> = Queue::with_options(QueueOptions::new().concurrency(0));
        assert_eq!(queue.concurrency(), constants::DEFAULT_CONCURRENCY);
    }

    #[tokio::test]
    async fn test_reopen_starts_second_epoch() {
        let worker = Arc::new(MockWorker::new_success());
        let (queue, mut rx) = queue_with_worker(1, worker.clone());

        queue.add("a".to_string()).add("b".to_string());
        queue.close();
        assert_eq!(timeout(RECV_TIMEOUT, rx.recv()).await.unwrap(), Some(None));
        assert!(queue.is_closed());

        queue.open();
        assert!(!queue.is_closed());

        queue.add("c".to_string());
        queue.close();
        assert_eq!(timeout(RECV_TIMEOUT, rx.recv()).await.unwrap(), Some(None));
        assert_eq!(worker.processed(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_clones_share_one_queue() {
        let worker = Arc::new(MockWorker::new_success());
        let (queue, mut rx) = queue_with_worker(2, worker.clone());

        let handle = queue.clone();
        queue.add("from-original".to_string());
        handle.add("from-clone".to_string());
        handle.close();

        assert_eq!(timeout(RECV_TIMEOUT, rx.recv()).await.unwrap(), Some(None));
        assert_eq!(worker.call_count(), 2);
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn test_worker_swap_applies_to_undispatched_items() {
        let first = Arc::new(MockWorker::new_delay(Duration::from_millis(80)));
        let second = Arc::new(MockWorker::new_success());
        let (queue, mut rx) = queue_with_worker(1, first.clone());

        queue.add("one".to_string()).add("two".to_string());
        sleep(Duration::from_millis(30)).await;
        queue.set_worker(second.clone());
        queue.close();

        assert_eq!(timeout(RECV_TIMEOUT, rx.recv()).await.unwrap(), Some(None));
        assert_eq!(first.processed(), vec!["one"]);
        assert_eq!(second.processed(), vec!["two"]);
    }
}
