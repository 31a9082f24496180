use std::sync::{Mutex, MutexGuard, PoisonError, Condvar};
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// Mutex with associated condvar.
/// The condvar can only be used through the guard of its own mutex,
/// so a waiter can never park on the wrong lock.
///
/// Every critical section in this crate leaves the guarded value consistent,
/// so a poisoned lock is recovered rather than reported.
#[derive(Debug, Default)]
pub struct CondMutex<T> {
  mx: Mutex<T>,
  cv: Condvar
}

impl<T> CondMutex<T> {
  pub fn new(t: T) -> CondMutex<T> {
    CondMutex {
      mx: Mutex::new(t),
      cv: Condvar::new()
    }
  }

  pub fn lock(&self) -> CondMutexGuard<'_, T> {
    let guard = self.mx.lock().unwrap_or_else(PoisonError::into_inner);
    CondMutexGuard { guard, cv: &self.cv }
  }
}

#[derive(Debug)]
pub struct CondMutexGuard<'a, T: ?Sized + 'a> {
  guard: MutexGuard<'a, T>,
  cv: &'a Condvar
}

impl<'a, T> CondMutexGuard<'a, T> {
  pub fn wait(self) -> CondMutexGuard<'a, T> {
    let cv = self.cv;
    let guard = cv.wait(self.guard).unwrap_or_else(PoisonError::into_inner);
    CondMutexGuard { guard, cv }
  }

  // Spurious and early wakeups are possible; callers re-check their deadline.
  pub fn wait_timeout(self, timeout: Duration) -> CondMutexGuard<'a, T> {
    let cv = self.cv;
    let (guard, _) = cv.wait_timeout(self.guard, timeout).unwrap_or_else(PoisonError::into_inner);
    CondMutexGuard { guard, cv }
  }

  pub fn notify_all(&self) {
    self.cv.notify_all()
  }
}

impl<T: ?Sized> Deref for CondMutexGuard<'_, T> {
  type Target = T;

  fn deref(&self) -> &T {
    self.guard.deref()
  }
}

impl<T: ?Sized> DerefMut for CondMutexGuard<'_, T> {
  fn deref_mut(&mut self) -> &mut T {
    self.guard.deref_mut()
  }
}
