use super::*;
use std::sync::mpsc;
use std::time::Duration;

#[test]
fn zero_threads_is_rejected() {
    let err = RenderScheduler::new(SchedulerOpts { threads: Some(0) }).unwrap_err();
    assert!(matches!(err, LottieError::Validation(_)));
}

#[test]
fn runs_every_job() {
    let pool = RenderScheduler::new(SchedulerOpts { threads: Some(3) }).unwrap();
    assert_eq!(pool.threads(), 3);
    let (tx, rx) = mpsc::channel();
    for i in 0..64 {
        let tx = tx.clone();
        pool.spawn(Box::new(move || tx.send(i).unwrap()));
    }
    drop(tx);
    let mut seen: Vec<i32> = rx.iter().take(64).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..64).collect::<Vec<_>>());
}

#[test]
fn a_panicking_job_does_not_kill_the_worker() {
    let pool = RenderScheduler::new(SchedulerOpts { threads: Some(1) }).unwrap();
    pool.spawn(Box::new(|| panic!("boom")));
    let (tx, rx) = mpsc::channel();
    pool.spawn(Box::new(move || tx.send(7).unwrap()));
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
}

#[test]
fn drop_finishes_queued_jobs() {
    let (tx, rx) = mpsc::channel();
    {
        let pool = RenderScheduler::new(SchedulerOpts { threads: Some(2) }).unwrap();
        for i in 0..16 {
            let tx = tx.clone();
            pool.spawn(Box::new(move || {
                std::thread::sleep(Duration::from_millis(1));
                tx.send(i).unwrap();
            }));
        }
    }
    drop(tx);
    assert_eq!(rx.iter().count(), 16);
}

#[test]
fn global_pool_is_shared() {
    let a = RenderScheduler::global().unwrap();
    let b = RenderScheduler::global().unwrap();
    assert!(std::ptr::eq(a, b));
    assert!(a.threads() >= 1);
}
