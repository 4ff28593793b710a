use futures::future::join_all;
use rand::Rng;
use tokio::sync::broadcast;
use tower::limit::ConcurrencyLimit;
use tower::ServiceExt;
use tracing::{debug, info};

use crate::{
    common::{Color, GroupId, ImageId, PivotId},
    config::Configuration,
    error::{AppError, PaletteError},
    pipeline::{
        services::{
            export::{ExportConfig, ExportProjector, ExportReport},
            image::{
                create_palette_pipeline, ImageSource, Palette, PaletteRequest, PaletteSampler,
                PaletteService,
            },
            managers::{ColorPool, GroupRegistry, ImageStore},
            sorting::{self, SortEngine},
        },
        types::{Image, StoreEvent, TransferChannel},
    },
};

struct CachedExport {
    revision: u64,
    config: ExportConfig,
    report: ExportReport,
}

/// Owns every store and routes upstream notifications to the sort engine,
/// so pool and group membership stay consistent after each call.
///
/// Every mutation bumps the revision and is published to subscribers.
pub struct Coordinator {
    configuration: Configuration,
    images: ImageStore,
    pool: ColorPool,
    groups: GroupRegistry,
    channel: TransferChannel,
    palette_pipeline: ConcurrencyLimit<PaletteService>,
    events: broadcast::Sender<StoreEvent>,
    revision: u64,
    export_cache: Option<CachedExport>,
}

impl Coordinator {
    fn new(configuration: Configuration, palette_service: PaletteService) -> Self {
        let (events, _) = broadcast::channel(configuration.event_buffer_size);
        let palette_pipeline =
            create_palette_pipeline(palette_service, configuration.extraction_concurrency);

        Self {
            pool: ColorPool::new().with_slot_count(configuration.slot_count),
            groups: GroupRegistry::new()
                .with_max_lead_color_attempts(configuration.max_lead_color_attempts),
            images: ImageStore::new(),
            channel: TransferChannel::new(),
            palette_pipeline,
            events,
            revision: 0,
            export_cache: None,
            configuration,
        }
    }

    pub fn builder(configuration: Configuration) -> CoordinatorBuilder {
        CoordinatorBuilder::new(configuration)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn publish(&mut self, event: StoreEvent) {
        self.revision += 1;
        debug!("Store event {:?} (revision {})", event, self.revision);
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn engine(&mut self) -> SortEngine<'_> {
        SortEngine::new(&self.pool, &mut self.groups)
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn pool(&self) -> &ColorPool {
        &self.pool
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // Images

    pub fn add_image(&mut self, image: Image) -> ImageId {
        let image_id = self.images.insert(image);
        self.publish(StoreEvent::ImageAdded { image_id });
        image_id
    }

    /// Drops an image with its colors and every group membership they had.
    pub fn remove_image(&mut self, image_id: &ImageId) -> bool {
        let detached = self.engine().unsort_image(image_id);
        self.pool.remove_collection(image_id);
        if self.images.remove(image_id).is_none() {
            return false;
        }

        info!("Removed image {} ({} memberships dropped)", image_id, detached);
        self.publish(StoreEvent::ImageRemoved {
            image_id: *image_id,
        });
        true
    }

    fn palette_request(&self, image_id: ImageId, source: ImageSource) -> PaletteRequest {
        PaletteRequest::new(image_id, source, self.configuration.slot_count)
            .with_quality(self.configuration.palette_quality)
    }

    /// Samples the palette of a registered image and (re)creates its color
    /// slots. Returns how many slots were filled.
    pub async fn extract_colors(
        &mut self,
        image_id: ImageId,
        source: ImageSource,
    ) -> Result<usize, AppError> {
        if !self.images.contains(&image_id) {
            return Err(PaletteError::UnknownImage(image_id).into());
        }

        let request = self.palette_request(image_id, source);
        let palette = self.palette_pipeline.clone().oneshot(request).await?;
        Ok(self.apply_palette(palette))
    }

    /// Extracts several images concurrently, then applies the palettes in
    /// request order.
    pub async fn extract_all(
        &mut self,
        sources: Vec<(ImageId, ImageSource)>,
    ) -> Vec<Result<usize, AppError>> {
        let pending = sources.into_iter().map(|(image_id, source)| {
            let known = self.images.contains(&image_id);
            let request = self.palette_request(image_id, source);
            let pipeline = self.palette_pipeline.clone();
            async move {
                if !known {
                    return Err(PaletteError::UnknownImage(image_id));
                }
                pipeline.oneshot(request).await
            }
        });
        let palettes = join_all(pending).await;

        palettes
            .into_iter()
            .map(|palette| -> Result<usize, AppError> { Ok(self.apply_palette(palette?)) })
            .collect()
    }

    fn apply_palette(&mut self, palette: Palette) -> usize {
        let Palette { image_id, colors } = palette;
        let amount = self.pool.create_color_collection(image_id, &colors);
        // Memberships of a previous extraction heal or drop here.
        self.engine().invalidate();
        self.publish(StoreEvent::ColorsExtracted { image_id, amount });
        amount
    }

    // Colors

    /// Overrides one slot with `hex`. Evicts it from its group when the
    /// effective color actually changes.
    pub fn set_handpicked(
        &mut self,
        image_id: &ImageId,
        slot: usize,
        hex: &str,
    ) -> Result<bool, AppError> {
        let color = Color::from_hex(hex)?;
        if !self.pool.set_handpicked(image_id, slot, color) {
            return Ok(false);
        }
        self.after_handpick(PivotId::new(*image_id, slot));
        Ok(true)
    }

    pub fn clear_handpicked(&mut self, image_id: &ImageId, slot: usize) -> bool {
        if !self.pool.clear_handpicked(image_id, slot) {
            return false;
        }
        self.after_handpick(PivotId::new(*image_id, slot));
        true
    }

    pub fn clear_all_handpicked(&mut self, image_id: &ImageId) -> usize {
        let cleared = self.pool.clear_all_handpicked(image_id);
        if cleared > 0 {
            self.engine().invalidate();
            self.publish(StoreEvent::MembershipChanged);
        }
        cleared
    }

    fn after_handpick(&mut self, pivot_id: PivotId) {
        self.engine().invalidate();
        self.publish(StoreEvent::HandpickedChanged { pivot_id });
    }

    /// Removes one color slot of an image, detaching it from its group.
    pub fn remove_color(&mut self, image_id: &ImageId, slot: usize) -> bool {
        if self.pool.get(image_id, slot).is_none() {
            return false;
        }
        let pivot_id = PivotId::new(*image_id, slot);
        self.engine().detach_slot(&pivot_id);
        self.pool.remove_slot(image_id, slot);
        self.publish(StoreEvent::ColorRemoved { pivot_id });
        true
    }

    // Groups

    pub fn create_group(&mut self) -> Result<GroupId, AppError> {
        let mut rng = rand::rng();
        self.create_group_with(&mut rng)
    }

    pub fn create_group_with<R: Rng>(&mut self, rng: &mut R) -> Result<GroupId, AppError> {
        let group_id = self.groups.create_group_with(rng)?;
        if let Some(lead_color) = self
            .groups
            .get(&group_id)
            .map(|group| group.lead_color.hex.clone())
        {
            self.publish(StoreEvent::GroupCreated {
                group_id,
                lead_color,
            });
        }
        Ok(group_id)
    }

    pub fn delete_group(&mut self, group_id: &GroupId) -> bool {
        if !self.groups.delete_group(group_id) {
            return false;
        }
        self.publish(StoreEvent::GroupDeleted {
            group_id: *group_id,
        });
        true
    }

    pub fn clear_group(&mut self, group_id: &GroupId) -> bool {
        if !self.groups.clear_group(group_id) {
            return false;
        }
        self.publish(StoreEvent::GroupCleared {
            group_id: *group_id,
        });
        true
    }

    pub fn change_lead_color(&mut self, hex: &str, group_id: &GroupId) -> Result<bool, AppError> {
        if !self.groups.change_lead_color(hex, group_id)? {
            return Ok(false);
        }
        if let Some(lead_color) = self
            .groups
            .get(group_id)
            .map(|group| group.lead_color.hex.clone())
        {
            self.publish(StoreEvent::LeadColorChanged {
                group_id: *group_id,
                lead_color,
            });
        }
        Ok(true)
    }

    // Sorting

    pub fn drag_start(&mut self, pivot: PivotId, origin: Option<GroupId>) -> Result<(), AppError> {
        sorting::drag_start(&mut self.channel, pivot, origin)?;
        Ok(())
    }

    /// Finishes the pending drag on `target`, `None` meaning outside any group.
    pub fn drop_on(&mut self, target: Option<GroupId>) -> bool {
        let mut engine = SortEngine::new(&self.pool, &mut self.groups);
        let moved = sorting::drop_on(&mut engine, &mut self.channel, target);
        if moved {
            self.publish(StoreEvent::MembershipChanged);
        }
        moved
    }

    pub fn transfer(
        &mut self,
        pivot: PivotId,
        origin: Option<GroupId>,
        target: Option<GroupId>,
    ) -> bool {
        let moved = self.engine().transfer(pivot, origin, target);
        if moved {
            self.publish(StoreEvent::MembershipChanged);
        }
        moved
    }

    pub fn auto_sort(&mut self) -> usize {
        let assigned = self.engine().auto_sort();
        if assigned > 0 {
            self.publish(StoreEvent::MembershipChanged);
        }
        assigned
    }

    pub fn reset_sorting(&mut self) {
        self.engine().reset_sorting();
        self.publish(StoreEvent::MembershipChanged);
    }

    pub fn invalidate(&mut self) -> usize {
        let dropped = self.engine().invalidate();
        if dropped > 0 {
            self.publish(StoreEvent::MembershipChanged);
        }
        dropped
    }

    // Export

    /// Export with the configured fields and casing, cached until the next
    /// mutation.
    pub fn export(&mut self) -> ExportReport {
        let config = self.configuration.export;
        self.export_with(config)
    }

    pub fn export_with(&mut self, config: ExportConfig) -> ExportReport {
        if let Some(cached) = &self.export_cache {
            if cached.revision == self.revision && cached.config == config {
                return cached.report.clone();
            }
        }

        let report = ExportProjector::new(&self.images, &self.pool, &self.groups, config).project();
        self.export_cache = Some(CachedExport {
            revision: self.revision,
            config,
            report: report.clone(),
        });
        report
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    palette_service: Option<PaletteService>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            palette_service: None,
        }
    }

    // Overrides the configured slot count.
    pub fn slot_count(mut self, slot_count: usize) -> Self {
        self.configuration.slot_count = slot_count;
        self
    }

    // Overrides the configured palette quality.
    pub fn palette_quality(mut self, palette_quality: usize) -> Self {
        self.configuration.palette_quality = palette_quality;
        self
    }

    pub fn max_lead_color_attempts(mut self, attempts: usize) -> Self {
        self.configuration.max_lead_color_attempts = attempts;
        self
    }

    pub fn extraction_concurrency(mut self, concurrency: usize) -> Self {
        self.configuration.extraction_concurrency = concurrency;
        self
    }

    pub fn export_config(mut self, export: ExportConfig) -> Self {
        self.configuration.export = export;
        self
    }

    pub fn sampler(mut self, sampler: impl PaletteSampler + 'static) -> Self {
        self.palette_service = Some(PaletteService::new(sampler));
        self
    }

    pub fn build(self) -> Result<Coordinator, AppError> {
        self.configuration.validate()?;
        let palette_service = self.palette_service.unwrap_or_default();
        Ok(Coordinator::new(self.configuration, palette_service))
    }
}
