//! Linked containers behind the library indexes
//!
//! Each container is generic over its element and knows nothing about songs
//! except [`SongGraph`], which is keyed by [`SongId`](crate::model::SongId).
//! Keeping them consistent with each other is the job of
//! [`MusicLibrary`](crate::library::MusicLibrary).

pub mod doubly;
pub mod genre;
pub mod graph;
pub mod queue;
pub mod singly;
pub mod stack;
pub mod title_tree;

pub use doubly::DoublyLinkedList;
pub use genre::GenreIndex;
pub use graph::SongGraph;
pub use queue::Queue;
pub use singly::SinglyLinkedList;
pub use stack::Stack;
pub use title_tree::TitleTree;
