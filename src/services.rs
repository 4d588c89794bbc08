pub mod action_gateway;
pub mod collaborators;
pub mod game_service;
pub mod game_store;
pub mod role_allocator;
pub mod win_evaluator;
