//! Single-slot task staging

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskStage {
    Idle = 0,
    Start = 1,
    Stage = 2,
    End = 3,
}

impl TaskStage {
    pub const ALL: [TaskStage; 4] = [
        TaskStage::Idle,
        TaskStage::Start,
        TaskStage::Stage,
        TaskStage::End,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            TaskStage::Idle => "idle",
            TaskStage::Start => "start",
            TaskStage::Stage => "stage",
            TaskStage::End => "end",
        }
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

impl ufmt::uDisplay for TaskStage {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        f.write_str(self.name())
    }
}

/// Next stage after each stage's work has run, indexed by [`TaskStage`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    next: [TaskStage; 4],
}

impl TransitionTable {
    /// Every stage returns straight to idle.
    pub const SCAFFOLD: Self = Self {
        next: [TaskStage::Idle; 4],
    };

    /// Start -> Stage -> End -> Idle
    pub const CHAINED: Self = Self {
        next: [
            TaskStage::Idle,
            TaskStage::Stage,
            TaskStage::End,
            TaskStage::Idle,
        ],
    };

    /// Idle always maps to Idle; the dispatcher only leaves it on a trigger.
    pub const fn new(start: TaskStage, stage: TaskStage, end: TaskStage) -> Self {
        Self {
            next: [TaskStage::Idle, start, stage, end],
        }
    }

    #[inline]
    pub const fn next(&self, stage: TaskStage) -> TaskStage {
        self.next[stage.index()]
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::SCAFFOLD
    }
}

/// Work performed when a stage is dispatched.
pub trait StageWork {
    fn run(&mut self, stage: TaskStage);
}

/// No work at any stage.
impl StageWork for () {
    fn run(&mut self, _stage: TaskStage) {}
}

impl<F: FnMut(TaskStage)> StageWork for F {
    fn run(&mut self, stage: TaskStage) {
        self(stage)
    }
}

/// Advances one task through its stages, one stage per main-loop pass.
pub struct Dispatcher<W = ()> {
    stage: TaskStage,
    table: TransitionTable,
    work: W,
}

impl Dispatcher<()> {
    pub const fn new(table: TransitionTable) -> Self {
        Self::with_work(table, ())
    }
}

impl<W: StageWork> Dispatcher<W> {
    pub const fn with_work(table: TransitionTable, work: W) -> Self {
        Self {
            stage: TaskStage::Idle,
            table,
            work,
        }
    }

    /// Request a new run. Overwrites whatever stage is in flight and returns
    /// the stage that was replaced, if any.
    pub fn trigger(&mut self) -> Option<TaskStage> {
        let previous = self.stage;
        self.stage = TaskStage::Start;
        if previous == TaskStage::Idle {
            None
        } else {
            Some(previous)
        }
    }

    /// Run the current stage's work and move to its successor.
    /// Returns the stage that ran, or `None` when idle.
    pub fn poll(&mut self) -> Option<TaskStage> {
        let current = self.stage;
        if current == TaskStage::Idle {
            return None;
        }

        self.work.run(current);
        self.stage = self.table.next(current);
        Some(current)
    }

    #[inline]
    pub fn stage(&self) -> TaskStage {
        self.stage
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.stage == TaskStage::Idle
    }

    pub fn work(&self) -> &W {
        &self.work
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_poll_does_nothing() {
        let mut dispatcher = Dispatcher::new(TransitionTable::SCAFFOLD);
        assert_eq!(dispatcher.poll(), None);
        assert!(dispatcher.is_idle());
    }

    #[test]
    fn scaffold_returns_to_idle_after_one_pass() {
        let mut dispatcher = Dispatcher::new(TransitionTable::SCAFFOLD);
        assert_eq!(dispatcher.trigger(), None);
        assert_eq!(dispatcher.stage(), TaskStage::Start);

        assert_eq!(dispatcher.poll(), Some(TaskStage::Start));
        assert!(dispatcher.is_idle());
        assert_eq!(dispatcher.poll(), None);
    }

    #[test]
    fn chained_walks_all_stages() {
        let mut seen = Vec::new();
        let mut dispatcher =
            Dispatcher::with_work(TransitionTable::CHAINED, |stage: TaskStage| seen.push(stage));
        dispatcher.trigger();

        while dispatcher.poll().is_some() {}
        drop(dispatcher);

        assert_eq!(seen, [TaskStage::Start, TaskStage::Stage, TaskStage::End]);
    }

    #[test]
    fn trigger_overwrites_in_flight_stage() {
        let mut dispatcher = Dispatcher::new(TransitionTable::CHAINED);
        dispatcher.trigger();
        dispatcher.poll();
        assert_eq!(dispatcher.stage(), TaskStage::Stage);

        assert_eq!(dispatcher.trigger(), Some(TaskStage::Stage));
        assert_eq!(dispatcher.stage(), TaskStage::Start);
    }

    #[test]
    fn table_never_leaves_idle_on_its_own() {
        for table in [TransitionTable::SCAFFOLD, TransitionTable::CHAINED] {
            assert_eq!(table.next(TaskStage::Idle), TaskStage::Idle);
            for stage in TaskStage::ALL {
                assert!(TaskStage::ALL.contains(&table.next(stage)));
            }
        }
    }

    #[test]
    fn custom_table() {
        let table = TransitionTable::new(TaskStage::End, TaskStage::Idle, TaskStage::Idle);
        let mut dispatcher = Dispatcher::new(table);
        dispatcher.trigger();
        assert_eq!(dispatcher.poll(), Some(TaskStage::Start));
        assert_eq!(dispatcher.poll(), Some(TaskStage::End));
        assert_eq!(dispatcher.poll(), None);
    }
}
