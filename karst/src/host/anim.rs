//! Actor animation channels.

use karst_script::Animator;

pub const NUM_ACTORS: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorChannel {
    pub res: u16,
    pub loops: u8,
    pub phase: i16,
    pub running: bool,
    pub dir: u8,
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Default)]
pub struct AnimChannels {
    actors: [ActorChannel; NUM_ACTORS],
}

impl AnimChannels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor(&self, actor: u8) -> Option<&ActorChannel> {
        self.actors.get(actor as usize)
    }

    /// Advance every running channel by one frame.
    pub fn tick(&mut self) {
        for a in self.actors.iter_mut().filter(|a| a.running) {
            a.phase = a.phase.wrapping_add(1);
        }
    }

    fn actor_mut(&mut self, actor: u8, what: &str) -> Option<&mut ActorChannel> {
        if actor as usize >= NUM_ACTORS {
            log::error!("{what}: invalid actor {actor}");
            return None;
        }
        Some(&mut self.actors[actor as usize])
    }
}

impl Animator for AnimChannels {
    fn start(&mut self, actor: u8, res: u16, loops: u8) {
        if let Some(a) = self.actor_mut(actor, "anim start") {
            a.res = res;
            a.loops = loops;
            a.phase = 0;
            a.running = true;
        }
    }

    fn stop(&mut self, actor: u8) {
        if let Some(a) = self.actor_mut(actor, "anim stop") {
            a.running = false;
        }
    }

    fn phase(&self, actor: u8) -> i16 {
        self.actor(actor).map(|a| a.phase).unwrap_or(0)
    }

    fn running(&self, actor: u8) -> bool {
        self.actor(actor).map(|a| a.running).unwrap_or(false)
    }

    fn face(&mut self, actor: u8, dir: u8) {
        if let Some(a) = self.actor_mut(actor, "face") {
            a.dir = dir;
        }
    }

    fn place(&mut self, actor: u8, x: i16, y: i16) {
        if let Some(a) = self.actor_mut(actor, "place") {
            a.x = x;
            a.y = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn channels_advance_only_while_running() {
        let mut anim = AnimChannels::new();
        anim.start(2, 30, 0);
        anim.start(3, 31, 1);
        anim.tick();
        anim.tick();
        anim.stop(3);
        anim.tick();

        assert_eq!(anim.phase(2), 3);
        assert_eq!(anim.phase(3), 2);
        assert!(anim.running(2));
        assert!(!anim.running(3));
    }

    #[test]
    fn restarting_resets_the_phase() {
        let mut anim = AnimChannels::new();
        anim.start(0, 5, 0);
        anim.tick();
        anim.start(0, 6, 0);
        assert_eq!(anim.phase(0), 0);
        assert_eq!(anim.actor(0).unwrap().res, 6);
    }

    #[test]
    fn placement_and_facing() {
        let mut anim = AnimChannels::new();
        anim.place(1, 40, 60);
        anim.face(1, 3);
        let a = anim.actor(1).unwrap();
        assert_eq!((a.x, a.y, a.dir), (40, 60, 3));
    }

    #[test]
    fn out_of_range_actors_read_as_idle() {
        let mut anim = AnimChannels::new();
        anim.start(99, 1, 0);
        assert!(!anim.running(99));
        assert_eq!(anim.phase(99), 0);
    }
}
