#[cfg(test)]
mod tests {
    use promise_settle::{all, all_settled, CancelToken, Error, Promise, Reason, Status};
    use std::thread;
    use std::time::Duration;

    fn delayed(value: i32, delay_ms: u64) -> Promise<i32> {
        Promise::new(move |resolve, _reject| {
            thread::sleep(Duration::from_millis(delay_ms));
            resolve.resolve(value)
        })
    }

    fn failing(message: &'static str) -> Promise<i32> {
        Promise::new(move |_resolve, reject| reject.reject(Reason::msg(message)))
    }

    #[test]
    fn test_all() {
        let token = CancelToken::new();
        let promises = vec![delayed(1, 0), delayed(2, 0), delayed(3, 0)];
        let values = all(&token, promises).wait(&token).unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_all_keeps_input_order() {
        let token = CancelToken::new();
        // later inputs settle first
        let promises: Vec<_> = (0..100).map(|i| delayed(i, (100 - i) as u64 % 7)).collect();
        let values = all(&token, promises).wait(&token).unwrap();
        assert_eq!(values, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_all_with_rejected() {
        let token = CancelToken::new();
        let promises = vec![delayed(1, 0), failing("something went wrong"), delayed(3, 0)];
        let combined = all(&token, promises);
        let reason = combined.wait(&token).unwrap_err();
        assert_eq!(reason.to_string(), "something went wrong");
        assert!(combined.value().is_none());
        assert_eq!(combined.status(), Some(Status::Rejected));
    }

    #[test]
    fn test_all_waits_for_every_input() {
        let token = CancelToken::new();
        let slow = delayed(1, 50);
        let combined = all(&token, vec![failing("early"), slow.clone()]);
        combined.wait(&token).unwrap_err();
        assert!(slow.is_settled());
    }

    #[test]
    fn test_all_shares_inputs() {
        let token = CancelToken::new();
        let shared = delayed(5, 0);
        let combined = all(&token, vec![shared.clone(), shared.clone()]);
        assert_eq!(combined.wait(&token).unwrap(), vec![5, 5]);
        assert_eq!(shared.wait(&token).unwrap(), 5);
    }

    #[test]
    fn test_all_rejects_with_token_reason() {
        let token = CancelToken::new();
        let stuck = Promise::<i32>::new(|_resolve, _reject| {});
        let combined = all(&token, vec![delayed(1, 0), stuck]);
        thread::sleep(Duration::from_millis(10));
        token.cancel_with(Reason::msg("gave up"));
        let reason = combined.wait(&CancelToken::new()).unwrap_err();
        assert_eq!(reason.to_string(), "gave up");
    }

    #[test]
    fn test_all_settled() {
        let token = CancelToken::new();
        let promises = vec![delayed(1, 0), failing("something went wrong"), delayed(3, 0)];
        let results = all_settled(&token, promises).wait(&token).unwrap();
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].status, Status::Fulfilled);
        assert_eq!(results[0].value, Some(1));
        assert!(results[0].reason.is_none());

        assert_eq!(results[1].status, Status::Rejected);
        assert!(results[1].value.is_none());
        let reason = results[1].reason.as_ref().expect("rejected slot");
        assert_eq!(reason.to_string(), "something went wrong");

        assert_eq!(results[2].status, Status::Fulfilled);
        assert_eq!(results[2].value, Some(3));
    }

    #[test]
    fn test_all_settled_never_rejects() {
        let token = CancelToken::new();
        let promises: Vec<_> = (0..10).map(|_| failing("nope")).collect();
        let combined = all_settled(&token, promises);
        let results = combined.wait(&token).unwrap();
        assert!(combined.is_fulfilled());
        assert!(results.iter().all(|result| result.is_rejected()));
    }

    #[test]
    fn test_all_settled_records_abandoned_waits() {
        let token = CancelToken::with_timeout(Duration::from_millis(20));
        let stuck = Promise::<i32>::new(|_resolve, _reject| {});
        let results = all_settled(&token, vec![delayed(1, 0), stuck])
            .wait(&CancelToken::new())
            .unwrap();
        assert_eq!(results[0].value, Some(1));
        let reason = results[1].clone().into_result().unwrap_err();
        assert_eq!(reason.downcast_ref::<Error>(), Some(&Error::DeadlineExceeded));
    }
}
