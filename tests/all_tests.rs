#![allow(bad_style)]

mod pcx;

fn rand_bytes(count: usize) -> Vec<u8> {
  let mut buffer = vec![0; count];
  getrandom::getrandom(&mut buffer).unwrap();
  buffer
}

/// Turns on `log` output for the test, if the feature for it is on.
fn init_logging() {
  let _ = env_logger::builder().is_test(true).try_init();
}
