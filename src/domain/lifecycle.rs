use std::fmt;

use crate::domain::entities::BookingStatus;

// Follow-up a client may offer for a booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BookingAction {
    Pay,
    Dispute,
    Review,
}

impl BookingAction {
    const ALL: [BookingAction; 3] = [BookingAction::Pay, BookingAction::Dispute, BookingAction::Review];

    fn bit(self) -> u8 {
        match self {
            BookingAction::Pay => 0b001,
            BookingAction::Dispute => 0b010,
            BookingAction::Review => 0b100,
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingAction::Pay => "PAY",
            BookingAction::Dispute => "DISPUTE",
            BookingAction::Review => "REVIEW",
        };
        f.write_str(name)
    }
}

// Set of legal actions. The empty set is the NONE outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActionSet(u8);

impl ActionSet {
    pub const NONE: ActionSet = ActionSet(0);

    pub fn of(actions: &[BookingAction]) -> Self {
        ActionSet(actions.iter().fold(0, |bits, action| bits | action.bit()))
    }

    pub fn contains(self, action: BookingAction) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = BookingAction> {
        BookingAction::ALL
            .into_iter()
            .filter(move |action| self.contains(*action))
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("NONE");
        }
        let names: Vec<String> = self.iter().map(|action| action.to_string()).collect();
        f.write_str(&names.join(", "))
    }
}

// Legal next actions for a booking in the given status.
pub fn actions_for(status: &BookingStatus) -> ActionSet {
    match status {
        BookingStatus::Pending => ActionSet::of(&[BookingAction::Pay, BookingAction::Dispute]),
        BookingStatus::Confirmed => ActionSet::of(&[BookingAction::Dispute]),
        BookingStatus::Completed => ActionSet::of(&[BookingAction::Review]),
        BookingStatus::Failed => ActionSet::NONE,
        // The server may introduce statuses this client has no actions for yet.
        BookingStatus::Unknown(_) => ActionSet::NONE,
    }
}

// Terminal statuses never change again on the server.
pub fn is_terminal(status: &BookingStatus) -> bool {
    match status {
        BookingStatus::Completed | BookingStatus::Failed => true,
        BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Unknown(_) => false,
    }
}
