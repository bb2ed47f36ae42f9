use tv_core::{PatternKind, Placement, Probabilities, ResourceId, ThreadId, Vec2, Viewport};
use tv_entity::{EventKind, Placements, ResourceKind, ResourceState, Role, Thread, World};

use super::ring;
use crate::{Attempt, Pattern, StepContext};

const TABLE: ResourceId = ResourceId(0);
const AGENT: ThreadId = ThreadId(0);

pub const INGREDIENT_NAMES: [&str; 5] = ["Tobacco", "Paper", "Matches", "Lighter", "Filter"];

/// An agent and one smoker per ingredient.
///
/// Smoker `i` has an endless supply of ingredient `i` and needs all the
/// others.  The agent, whenever the table is clear, puts out every
/// ingredient but one; only the smoker holding the missing one can take
/// them and smoke.  Ingredients on the table are OCCUPIED; ingredients in
/// a smoker's hands are LOCKED.
#[derive(Debug, Clone)]
pub struct CigaretteSmokers {
    pub ingredients:   usize,
    pub probabilities: Probabilities,
}

impl CigaretteSmokers {
    pub fn new(ingredients: usize, probabilities: Probabilities) -> Self {
        Self { ingredients, probabilities }
    }

    #[inline]
    fn ingredient(i: usize) -> ResourceId {
        ResourceId(i as u32 + 1)
    }

    /// Index of the ingredient `smoker` never runs out of.
    #[inline]
    fn own_ingredient(smoker: ThreadId) -> usize {
        smoker.index() - 1
    }

    fn on_table(&self, ctx: &StepContext<'_>, i: usize) -> bool {
        ctx.resource(Self::ingredient(i)).state == ResourceState::Occupied
    }

    fn supply(&self, ctx: &mut StepContext<'_>) -> Attempt {
        let clear = ctx.resource(TABLE).count() == 0
            && (0..self.ingredients).all(|i| ctx.resource(Self::ingredient(i)).is_free());
        if !clear {
            return Attempt::blocked(TABLE, "Agent is waiting for the table to clear");
        }

        let missing = ctx.pick(self.ingredients);
        let mut placed = Vec::with_capacity(self.ingredients - 1);
        for i in (0..self.ingredients).filter(|&i| i != missing) {
            ctx.set_resource_state(Self::ingredient(i), ResourceState::Occupied);
            placed.push(INGREDIENT_NAMES[i]);
        }
        ctx.set_count(TABLE, placed.len() as u32);
        ctx.emit(
            EventKind::AgentSupplied,
            Some(AGENT),
            Some(TABLE),
            format!("Agent placed {} on the table", and_list(&placed)),
        );
        Attempt::Complete
    }

    fn take(&self, smoker: ThreadId, ctx: &mut StepContext<'_>) -> Attempt {
        if !ctx.thread(smoker).held.is_empty() {
            return Attempt::Complete;
        }
        let own = Self::own_ingredient(smoker);
        let needed: Vec<usize> = (0..self.ingredients).filter(|&i| i != own).collect();
        let name = ctx.thread(smoker).name.clone();

        let ready = !self.on_table(ctx, own) && needed.iter().all(|&i| self.on_table(ctx, i));
        if !ready {
            let wants: Vec<&str> = needed.iter().map(|&i| INGREDIENT_NAMES[i]).collect();
            return Attempt::blocked(TABLE, format!("{name} is waiting for {}", and_list(&wants)));
        }

        for i in needed {
            ctx.grant(
                smoker,
                Self::ingredient(i),
                ResourceState::Locked,
                format!("{name} picked up {}", INGREDIENT_NAMES[i]),
            );
        }
        ctx.set_count(TABLE, 0);
        Attempt::Complete
    }
}

impl Pattern for CigaretteSmokers {
    fn kind(&self) -> PatternKind {
        PatternKind::CigaretteSmokers
    }

    fn probabilities(&self) -> Probabilities {
        self.probabilities
    }

    fn populate(&self, world: &mut World) {
        let capacity = self.ingredients as u32 - 1;
        world.add_counting_resource("Table", ResourceKind::Buffer, capacity);
        for name in &INGREDIENT_NAMES[..self.ingredients] {
            world.add_resource(*name, ResourceKind::Resource);
        }
        world.add_thread("Agent", Role::Agent);
        for i in 0..self.ingredients {
            world.add_thread(format!("Smoker {}", i + 1), Role::Smoker);
        }
    }

    /// Agent above the table, ingredients in a tight ring around it,
    /// smokers on a wider ring shifted down.
    fn arrange(&self, _world: &World, viewport: &Viewport) -> Placements {
        let c = viewport.center();
        let n = self.ingredients;
        let mut threads = vec![Placement::at(c - Vec2::new(0.0, 150.0))];
        threads.extend(
            ring(c, viewport.half_extent() * 0.6, n).map(|p| Placement::at(p + Vec2::new(0.0, 100.0))),
        );
        let mut resources = vec![Placement::at(c)];
        resources.extend(ring(c, 80.0, n).map(Placement::at));
        Placements { threads, resources }
    }

    fn attempt(&self, thread: ThreadId, ctx: &mut StepContext<'_>) -> Attempt {
        match ctx.thread(thread).role {
            Role::Agent => self.supply(ctx),
            _           => self.take(thread, ctx),
        }
    }

    /// The agent goes straight back to watching the table.
    fn work_probability(&self, thread: &Thread) -> f64 {
        match thread.role {
            Role::Agent => 0.0,
            _           => self.probabilities.work,
        }
    }

    fn work_event(&self, thread: &Thread, _ctx: &StepContext<'_>) -> (EventKind, String) {
        (EventKind::SmokerSmoking, format!("{} is smoking", thread.name))
    }
}

/// `"A"`, `"A and B"`, `"A, B and C"`.
fn and_list(items: &[&str]) -> String {
    match items {
        []           => String::new(),
        [one]        => (*one).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}
