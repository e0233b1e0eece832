mod room;

pub use room::InMemoryRoomStore;
