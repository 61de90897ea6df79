use bevy::prelude::*;

mod catalog;
mod compat;
mod geo;
mod plugins;
mod trips;

fn main() {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.85, 0.84, 0.76)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Canyon Lakes Trails".to_string(),
                resolution: (1280.0, 800.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((
            plugins::core::CorePlugin,
            plugins::persistence::PersistencePlugin,
            plugins::map::MapPlugin,
            plugins::ui::UIPlugin,
            plugins::auth::AuthPlugin,
        ))
        .run();
}
