pub mod tick_loop;
