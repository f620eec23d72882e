//! Album and data catalogue operations.

use crate::client::GalleryClient;
use crate::error::Result;
use crate::types::{AlbumInfo, CreateAlbumInfo, DataInfo};
use reqwest::Method;
use tracing::{debug, info};

impl GalleryClient {
    /// List all albums visible to the current token.
    pub async fn get_albums(&self) -> Result<Vec<AlbumInfo>> {
        let endpoint = "api/albums";
        let albums: Vec<AlbumInfo> = self
            .execute_json(self.request(Method::GET, endpoint).await, endpoint)
            .await?;

        debug!(albums = albums.len(), "Fetched albums");
        Ok(albums)
    }

    /// Create an album; the returned info carries the server-assigned ID.
    pub async fn create_album(&self, info: &CreateAlbumInfo) -> Result<AlbumInfo> {
        let endpoint = "api/album";
        let request = self.request(Method::POST, endpoint).await.json(info);
        let album: AlbumInfo = self.execute_json(request, endpoint).await?;

        info!(album_id = album.id, name = %album.name, "Album created");
        Ok(album)
    }

    pub async fn delete_album(&self, album_id: i64) -> Result<()> {
        let endpoint = format!("api/album/{}", album_id);
        self.execute(self.request(Method::DELETE, &endpoint).await, &endpoint)
            .await?;

        debug!(album_id, "Album deleted");
        Ok(())
    }

    /// List data items that do not belong to any album.
    pub async fn get_data_without_albums(&self) -> Result<Vec<DataInfo>> {
        let endpoint = "api/data";
        let data: Vec<DataInfo> = self
            .execute_json(self.request(Method::GET, endpoint).await, endpoint)
            .await?;

        debug!(items = data.len(), "Fetched data without album");
        Ok(data)
    }

    /// List the data items of one album.
    pub async fn get_album_data(&self, album_id: i64) -> Result<Vec<DataInfo>> {
        let endpoint = format!("api/album/{}/data", album_id);
        let data: Vec<DataInfo> = self
            .execute_json(self.request(Method::GET, &endpoint).await, &endpoint)
            .await?;

        debug!(album_id, items = data.len(), "Fetched album data");
        Ok(data)
    }

    pub async fn delete_data(&self, data_id: i64) -> Result<()> {
        let endpoint = format!("api/data/{}", data_id);
        self.execute(self.request(Method::DELETE, &endpoint).await, &endpoint)
            .await?;

        debug!(data_id, "Data deleted");
        Ok(())
    }
}
