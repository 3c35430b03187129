//! Lock-counted cooperative turn scheduler.
//!
//! Actors sit in a ring. Unlocking the scheduler down to depth zero drains
//! the ring: the front actor takes its turn and rotates to the back, over and
//! over, until something raises the lock again. An actor raises it either by
//! locking through its [`Control`] handle (it will be resumed by someone
//! calling [`Scheduler::unlock`] later) or by returning [`Turn::Pending`],
//! which parks an unlock until the pending result is ready.

use std::cell::Cell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::{GameError, GameResult};

/// Outcome of a single actor turn.
#[derive(Debug)]
pub enum Turn {
    Done,
    /// The turn is not over yet. The scheduler stays locked until the
    /// pending result resolves.
    Pending(Pending),
}

#[derive(Debug)]
pub struct Pending {
    wake: Wake,
}

#[derive(Debug)]
enum Wake {
    At(Instant),
    Latch(Rc<Cell<bool>>),
}

impl Pending {
    pub fn until(deadline: Instant) -> Self {
        Pending {
            wake: Wake::At(deadline),
        }
    }

    pub fn after(delay: Duration) -> Self {
        Self::until(Instant::now() + delay)
    }

    /// A pending result released by hand through the returned [`Latch`].
    /// Actors waiting on something other than the clock (an animation, a
    /// dialog) park on one of these and release it when done.
    pub fn latch() -> (Self, Latch) {
        let flag = Rc::new(Cell::new(false));
        (
            Pending {
                wake: Wake::Latch(flag.clone()),
            },
            Latch(flag),
        )
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        match &self.wake {
            Wake::At(deadline) => now >= *deadline,
            Wake::Latch(flag) => flag.get(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Latch(Rc<Cell<bool>>);

impl Latch {
    pub fn release(&self) {
        self.0.set(true);
    }
}

pub trait Actor<W>: Sized {
    fn act(&mut self, world: &mut W, ctl: &mut Control<'_, Self>) -> Turn;

    /// Whether the actor refers to something that can take a turn in `world`.
    fn is_bound(&self, _world: &W) -> bool {
        true
    }
}

/// The scheduler as seen from inside a turn.
pub struct Control<'a, A> {
    lock: &'a mut u32,
    queue: &'a mut VecDeque<A>,
    halt: bool,
}

impl<A: fmt::Debug> Control<'_, A> {
    pub fn lock(&mut self) {
        *self.lock += 1;
    }

    pub fn depth(&self) -> u32 {
        *self.lock
    }

    /// Stop the run once the current turn returns.
    pub fn stop(&mut self) {
        self.halt = true;
    }

    pub fn add<W>(&mut self, actor: A, world: &W) -> GameResult<()>
    where
        A: Actor<W>,
    {
        enqueue(&mut *self.queue, actor, world)
    }
}

fn enqueue<A, W>(queue: &mut VecDeque<A>, actor: A, world: &W) -> GameResult<()>
where
    A: Actor<W> + fmt::Debug,
{
    if !actor.is_bound(world) {
        return Err(GameError::InvalidActor(format!("{actor:?}")));
    }
    queue.push_back(actor);
    Ok(())
}

#[derive(Debug)]
struct Parked {
    pending: Pending,
    epoch: u64,
}

#[derive(Debug)]
pub struct Scheduler<A> {
    queue: VecDeque<A>,
    lock: u32,
    parked: Vec<Parked>,
    // Bumped on every stop. Continuations parked in an older epoch are
    // dropped instead of unlocking.
    epoch: u64,
    running: bool,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    /// A new scheduler is locked once; the first `start` releases it.
    pub fn new() -> Self {
        Scheduler {
            queue: VecDeque::new(),
            lock: 1,
            parked: Vec::new(),
            epoch: 0,
            running: false,
        }
    }

    pub fn lock(&mut self) {
        self.lock += 1;
    }

    pub fn depth(&self) -> u32 {
        self.lock
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pending results still waiting to resume this run.
    pub fn parked(&self) -> usize {
        self.parked.iter().filter(|p| p.epoch == self.epoch).count()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn actors(&self) -> impl Iterator<Item = &A> {
        self.queue.iter()
    }

    /// Halt the run: back to idle depth, queue emptied, and every parked
    /// continuation made stale.
    pub fn stop(&mut self) {
        self.lock = 1;
        self.clear();
        self.epoch += 1;
        self.running = false;
        log::debug!("scheduler stopped, epoch {}", self.epoch);
    }
}

impl<A: fmt::Debug> Scheduler<A> {
    pub fn add<W>(&mut self, actor: A, world: &W) -> GameResult<()>
    where
        A: Actor<W>,
    {
        enqueue(&mut self.queue, actor, world)
    }

    pub fn start<W>(&mut self, world: &mut W)
    where
        A: Actor<W>,
    {
        if self.running {
            log::warn!("scheduler already running");
            return;
        }
        self.running = true;
        self.unlock(world);
    }

    pub fn unlock<W>(&mut self, world: &mut W)
    where
        A: Actor<W>,
    {
        if self.lock == 0 {
            log::warn!("unlock on an unlocked scheduler ignored");
            return;
        }
        self.lock -= 1;
        while self.lock == 0 {
            let Some(mut actor) = self.queue.pop_front() else {
                self.lock += 1;
                return;
            };
            // Rotated actor goes in front of anything it adds this turn.
            let slot = self.queue.len();
            let mut ctl = Control {
                lock: &mut self.lock,
                queue: &mut self.queue,
                halt: false,
            };
            let turn = actor.act(world, &mut ctl);
            let halt = ctl.halt;
            if halt {
                self.stop();
                return;
            }
            self.queue.insert(slot, actor);
            if let Turn::Pending(pending) = turn {
                self.lock += 1;
                self.parked.push(Parked {
                    pending,
                    epoch: self.epoch,
                });
                return;
            }
        }
    }

    /// Fire the continuations of every parked result that is ready at `now`.
    /// Returns how many of them unlocked the scheduler.
    pub fn resume<W>(&mut self, world: &mut W, now: Instant) -> usize
    where
        A: Actor<W>,
    {
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.parked)
            .into_iter()
            .partition(|p| p.pending.is_ready(now));
        self.parked = waiting;
        self.parked.retain(|p| p.epoch == self.epoch);

        let mut resumed = 0;
        for parked in ready {
            if parked.epoch != self.epoch {
                log::debug!("dropping continuation from stopped epoch {}", parked.epoch);
                continue;
            }
            resumed += 1;
            self.unlock(world);
        }
        resumed
    }
}
