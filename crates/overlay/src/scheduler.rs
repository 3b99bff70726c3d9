//! Single-threaded macrotask queue.
//!
//! Deferral in the overlay core means "run on a later turn of the event loop",
//! never blocking. The host drives the queue: one [`TaskQueue::run_next`] call
//! is one macrotask turn.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

struct QueuedTask {
	seq: u64,
	label: &'static str,
	task: Task,
}

#[derive(Default)]
struct QueueState {
	seq_next: u64,
	queue: VecDeque<QueuedTask>,
}

/// FIFO queue of zero-delay tasks.
///
/// Cloning yields another handle to the same queue. No borrow is held while a
/// task runs, so tasks may schedule further tasks; those run on later turns.
#[derive(Clone, Default)]
pub struct TaskQueue {
	state: Rc<RefCell<QueueState>>,
}

impl fmt::Debug for TaskQueue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("TaskQueue")
			.field("pending", &state.queue.len())
			.field("seq_next", &state.seq_next)
			.finish()
	}
}

impl TaskQueue {
	pub fn new() -> Self {
		Self::default()
	}

	/// Enqueues one task and returns its sequence number.
	pub fn schedule(&self, label: &'static str, task: impl FnOnce() + 'static) -> u64 {
		let mut state = self.state.borrow_mut();
		let seq = state.seq_next;
		state.seq_next = state.seq_next.wrapping_add(1);
		state.queue.push_back(QueuedTask {
			seq,
			label,
			task: Box::new(task),
		});
		seq
	}

	/// Runs the oldest queued task. Returns false when the queue was empty.
	pub fn run_next(&self) -> bool {
		let Some(item) = self.state.borrow_mut().queue.pop_front() else {
			return false;
		};
		tracing::trace!(seq = item.seq, label = item.label, "task.run");
		(item.task)();
		true
	}

	/// Runs tasks until the queue is empty, including tasks scheduled while
	/// draining. Returns the number of tasks run.
	pub fn run_until_idle(&self) -> usize {
		let mut ran = 0;
		while self.run_next() {
			ran += 1;
		}
		ran
	}

	pub fn len(&self) -> usize {
		self.state.borrow().queue.len()
	}

	pub fn is_empty(&self) -> bool {
		self.state.borrow().queue.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::TaskQueue;

	#[test]
	fn tasks_run_in_fifo_order_one_per_turn() {
		let queue = TaskQueue::new();
		let log = Rc::new(RefCell::new(Vec::new()));
		for n in 0..3 {
			let log = Rc::clone(&log);
			queue.schedule("push", move || log.borrow_mut().push(n));
		}

		assert!(queue.run_next());
		assert_eq!(*log.borrow(), vec![0]);
		assert_eq!(queue.len(), 2);
		assert_eq!(queue.run_until_idle(), 2);
		assert_eq!(*log.borrow(), vec![0, 1, 2]);
		assert!(!queue.run_next());
	}

	#[test]
	fn tasks_scheduled_while_running_go_to_the_back() {
		let queue = TaskQueue::new();
		let log = Rc::new(RefCell::new(Vec::new()));

		let q = queue.clone();
		let l = Rc::clone(&log);
		queue.schedule("outer", move || {
			l.borrow_mut().push("outer");
			let l = Rc::clone(&l);
			q.schedule("nested", move || l.borrow_mut().push("nested"));
		});
		let l = Rc::clone(&log);
		queue.schedule("sibling", move || l.borrow_mut().push("sibling"));

		assert_eq!(queue.run_until_idle(), 3);
		assert_eq!(*log.borrow(), vec!["outer", "sibling", "nested"]);
		assert!(queue.is_empty());
	}

	#[test]
	fn sequence_numbers_are_monotonic() {
		let queue = TaskQueue::new();
		let a = queue.schedule("a", || {});
		let b = queue.schedule("b", || {});
		assert!(b > a);
	}
}
