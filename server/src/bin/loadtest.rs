//! Load test for the arena relay.
//!
//! Spawns multiple fake participants that:
//! - Connect and wait for their bootstrap
//! - Push `state:update` messages at a fixed rate
//! - Count relayed states, joins and leaves
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]
//!
//! Options:
//!   --clients N      Number of participants to spawn (default: 50)
//!   --duration S     Test duration in seconds (default: 30)
//!   --rate R         State updates per second per participant (default: 20)
//!   --url URL        Server URL (default: ws://127.0.0.1:3001/ws)

use arena_shared::protocol::{BodyState, ClientMsg, ServerMsg};
use futures_util::{SinkExt, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

// === Metrics ===

#[derive(Default)]
struct Metrics {
    connected: AtomicU64,
    messages_received: AtomicU64,
    states_received: AtomicU64,
    joins_received: AtomicU64,
    leaves_received: AtomicU64,
    updates_sent: AtomicU64,
    errors: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

/// Random walk inside the arena, one step per update.
fn next_state(rng: &mut impl Rng, prev: &BodyState, dt: f64) -> BodyState {
    let vx = (prev.velocity[0] + rng.gen_range(-1.0..1.0)).clamp(-10.0, 10.0);
    let vz = (prev.velocity[2] + rng.gen_range(-1.0..1.0)).clamp(-10.0, 10.0);
    let x = (prev.position[0] + vx * dt).clamp(-19.5, 19.5);
    let z = (prev.position[2] + vz * dt).clamp(-19.5, 19.5);
    BodyState {
        position: [x, -1.5, z],
        velocity: [vx, 0.0, vz],
        rotation: [prev.rotation[0] + vz * dt, 0.0, prev.rotation[2] - vx * dt],
    }
}

// === Client task ===

async fn run_client(
    client_id: u32,
    url: String,
    rate: f64,
    duration: Duration,
    metrics: Arc<Metrics>,
) {
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if client_id < 5 {
                eprintln!("Client {} failed to connect: {}", client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    metrics.latency_sum_ms.fetch_add(
        connect_start.elapsed().as_millis() as u64,
        Ordering::Relaxed,
    );
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    // Wait for bootstrap before sending anything
    let bootstrap = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                    if let Ok(ServerMsg::Bootstrap(b)) = serde_json::from_str(&text) {
                        return Some(b.self_id);
                    }
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                _ => {}
            }
        }
        None
    })
    .await;

    let self_id = match bootstrap {
        Ok(Some(id)) => id,
        Ok(None) | Err(_) => {
            if client_id < 3 {
                eprintln!("Client {} got no bootstrap", client_id);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            metrics.connected.fetch_sub(1, Ordering::Relaxed);
            return;
        }
    };
    if client_id < 3 {
        eprintln!("Client {} is participant {}", client_id, self_id);
    }

    let dt = 1.0 / rate.max(0.01);
    let mut update_timer = tokio::time::interval(Duration::from_secs_f64(dt));
    update_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let test_end = Instant::now() + duration;
    let mut rng = StdRng::from_entropy();
    let mut state = BodyState::spawn(arena_shared::vec3::Vec3::new(0.0, 4.0, 0.0));

    while Instant::now() < test_end {
        tokio::select! {
            _ = update_timer.tick() => {
                state = next_state(&mut rng, &state, dt);
                let json = match serde_json::to_string(&ClientMsg::StateUpdate(state)) {
                    Ok(json) => json,
                    Err(_) => continue,
                };
                if ws.send(Message::Text(json.into())).await.is_ok() {
                    metrics.updates_sent.fetch_add(1, Ordering::Relaxed);
                } else {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        match serde_json::from_str::<ServerMsg>(&text) {
                            Ok(ServerMsg::State(_)) => {
                                metrics.states_received.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::Join(_)) => {
                                metrics.joins_received.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::Leave(_)) => {
                                metrics.leaves_received.fetch_add(1, Ordering::Relaxed);
                            }
                            _ => {}
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        if client_id < 3 {
                            eprintln!("Client {} error: {}", client_id, e);
                        }
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut num_clients: u32 = 50;
    let mut duration_secs: u64 = 30;
    let mut rate: f64 = 20.0;
    let mut url = "ws://127.0.0.1:3001/ws".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" => {
                i += 1;
                num_clients = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(50);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            "--rate" => {
                i += 1;
                rate = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(20.0);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            _ => {}
        }
        i += 1;
    }

    println!("=== Arena Relay Load Test ===");
    println!("Clients: {}", num_clients);
    println!("Duration: {}s", duration_secs);
    println!("Update rate: {}/s per client", rate);
    println!("URL: {}", url);
    println!();

    let metrics = Arc::new(Metrics::default());
    let duration = Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(num_clients as usize);
    let spawn_start = Instant::now();

    for client_id in 0..num_clients {
        let url = url.clone();
        let metrics = Arc::clone(&metrics);

        handles.push(tokio::spawn(async move {
            run_client(client_id, url, rate, duration, metrics).await;
        }));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    println!("All clients spawned in {:?}", spawn_start.elapsed());
    println!();

    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();

        loop {
            interval.tick().await;
            let elapsed = start.elapsed().as_secs();
            if elapsed >= duration_secs + 5 {
                break;
            }
            println!(
                "[{:3}s] connected={}, msgs={}, states={}, sent={}, errors={}",
                elapsed,
                metrics_clone.connected.load(Ordering::Relaxed),
                metrics_clone.messages_received.load(Ordering::Relaxed),
                metrics_clone.states_received.load(Ordering::Relaxed),
                metrics_clone.updates_sent.load(Ordering::Relaxed),
                metrics_clone.errors.load(Ordering::Relaxed),
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }

    stats_handle.abort();

    println!();
    println!("=== Final Results ===");
    let sent = metrics.updates_sent.load(Ordering::Relaxed);
    let states = metrics.states_received.load(Ordering::Relaxed);
    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);

    println!(
        "Total messages received: {}",
        metrics.messages_received.load(Ordering::Relaxed)
    );
    println!("Total state updates sent: {}", sent);
    println!("Total relayed states received: {}", states);
    println!(
        "Joins seen: {}, leaves seen: {}",
        metrics.joins_received.load(Ordering::Relaxed),
        metrics.leaves_received.load(Ordering::Relaxed)
    );
    println!("Errors: {}", metrics.errors.load(Ordering::Relaxed));
    if latency_count > 0 {
        println!("Avg connect latency: {}ms", latency_sum / latency_count);
    }
    // Every update should reach every other participant.
    if sent > 0 && num_clients > 1 {
        let expected = sent * (num_clients as u64 - 1);
        println!(
            "Relay fan-out: {:.1}% of expected",
            states as f64 / expected as f64 * 100.0
        );
    }
}
