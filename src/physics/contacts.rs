//! Collision event listener
//!
//! Rapier reports contact start/stop through a channel. Only contacts that
//! start and involve the ball are interesting to the game.

use rapier3d::prelude::{ColliderHandle, ColliderSet, CollisionEvent};

use super::CollisionCategories;

/// What a ball contact means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    BallTouchedFloor,
    BallHitNet,
    /// The ball touched something else (a wall, the camera, another ball)
    Other,
}

/// A started contact involving the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub kind: ContactKind,
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
}

/// Turn a raw rapier event into a game contact, or drop it.
pub fn classify(event: &CollisionEvent, colliders: &ColliderSet) -> Option<ContactEvent> {
    if !event.started() {
        return None;
    }
    let (h1, h2) = (event.collider1(), event.collider2());
    let categories = |h: ColliderHandle| {
        colliders
            .get(h)
            .map(|c| CollisionCategories::from_group(c.collision_groups().memberships))
            .unwrap_or(CollisionCategories::empty())
    };
    let pair = categories(h1) | categories(h2);
    if !pair.contains(CollisionCategories::BALL) {
        return None;
    }

    let kind = if pair.contains(CollisionCategories::FLOOR) {
        log::info!("The ball touched the floor");
        ContactKind::BallTouchedFloor
    } else if pair.contains(CollisionCategories::NET) {
        log::info!("The ball hit the net");
        ContactKind::BallHitNet
    } else {
        ContactKind::Other
    };

    Some(ContactEvent {
        kind,
        collider1: h1,
        collider2: h2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier3d::prelude::*;
    use rstest::rstest;

    fn collider(set: &mut ColliderSet, categories: CollisionCategories) -> ColliderHandle {
        set.insert(
            ColliderBuilder::ball(1.0)
                .collision_groups(categories.interaction_groups(categories.default_mask()))
                .build(),
        )
    }

    #[rstest]
    #[case::floor(CollisionCategories::ENVIRONMENT | CollisionCategories::FLOOR, Some(ContactKind::BallTouchedFloor))]
    #[case::net(CollisionCategories::ENVIRONMENT | CollisionCategories::NET, Some(ContactKind::BallHitNet))]
    #[case::wall(CollisionCategories::ENVIRONMENT, Some(ContactKind::Other))]
    fn started_ball_contacts_are_classified(
        #[case] other: CollisionCategories,
        #[case] expected: Option<ContactKind>,
    ) {
        let mut set = ColliderSet::new();
        let ball = collider(&mut set, CollisionCategories::BALL);
        let target = collider(&mut set, other);

        let event = CollisionEvent::Started(target, ball, CollisionEventFlags::empty());
        assert_eq!(classify(&event, &set).map(|e| e.kind), expected);
    }

    #[test]
    fn stopped_contacts_are_dropped() {
        let mut set = ColliderSet::new();
        let ball = collider(&mut set, CollisionCategories::BALL);
        let floor = collider(&mut set, CollisionCategories::FLOOR);
        let event = CollisionEvent::Stopped(ball, floor, CollisionEventFlags::empty());
        assert!(classify(&event, &set).is_none());
    }

    #[test]
    fn contacts_without_ball_are_dropped() {
        let mut set = ColliderSet::new();
        let camera = collider(&mut set, CollisionCategories::CAMERA);
        let floor = collider(&mut set, CollisionCategories::ENVIRONMENT | CollisionCategories::FLOOR);
        let event = CollisionEvent::Started(camera, floor, CollisionEventFlags::empty());
        assert!(classify(&event, &set).is_none());
    }
}
