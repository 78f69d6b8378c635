use dose_core::lifecycle::spawn_organism;
use dose_core::{deploy, Ecosystem, Population, Scenario, SimulationConfig};
use rand_chacha::ChaCha8Rng;

/// Spawns every configured population and places it on the grid.
pub(super) fn deploy_populations<S: Scenario>(
    config: &SimulationConfig,
    ecosystem: &mut Ecosystem,
    scenario: &S,
    rng: &mut ChaCha8Rng,
) -> anyhow::Result<Vec<Population>> {
    let template = config.organism_template();
    let mut populations = Vec::with_capacity(config.populations.len());

    for spec in &config.populations {
        let agents = (0..spec.size)
            .map(|_| spawn_organism(&template, &spec.name, rng))
            .collect();
        let mut population = Population::new(
            &spec.name,
            agents,
            spec.goal.unwrap_or(config.culling.goal),
            config.run.max_generations,
        )
        .with_culling(config.culling_policy())
        .with_mutation(config.mutation_policy())
        .with_vitality(template.vitality);

        deploy(
            &spec.deployment,
            &mut population,
            ecosystem,
            &spec.targets(),
            scenario,
            rng,
        )?;
        tracing::debug!(
            population = %population.name,
            size = population.len(),
            scheme = spec.deployment.name(),
            "Population spawned"
        );
        populations.push(population);
    }

    Ok(populations)
}
